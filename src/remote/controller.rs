//! Capability interface over the platform control plane.

use async_trait::async_trait;

use crate::remote::reply::Reply;
use crate::routing::types::{Domain, Route, RouteSpec};

/// The remote operations the reconciliation engine depends on.
///
/// Every call is one blocking round trip from the engine's point of view;
/// the engine awaits each reply before issuing the next call. Retries, if
/// any, belong to the implementation.
#[async_trait]
pub trait CloudController: Send + Sync {
    /// Return the subset of `names` that exist as domains visible to the
    /// organization. Names without a domain are simply absent.
    async fn resolve_domains_by_name_and_org(
        &self,
        names: &[String],
        org_guid: &str,
    ) -> Reply<Vec<Domain>>;

    /// All domains of the organization, private domains before shared ones.
    async fn list_organization_domains(&self, org_guid: &str) -> Reply<Vec<Domain>>;

    /// Find the route with the same settings in the requested space.
    ///
    /// Fails with [`RemoteError::RouteNotFound`](crate::remote::RemoteError::RouteNotFound)
    /// when no such route exists.
    async fn find_route_bound_to_space(&self, route: &RouteSpec) -> Reply<Route>;

    /// Create the route. With `generate_port` the remote side picks the port.
    async fn create_route(&self, route: &RouteSpec, generate_port: bool) -> Reply<Route>;

    /// Fails with [`RemoteError::RouteInDifferentSpace`](crate::remote::RemoteError::RouteInDifferentSpace)
    /// when the route is owned by another space.
    async fn bind_route_to_application(&self, route_guid: &str, app_guid: &str) -> Reply<()>;

    async fn unbind_route_from_application(&self, route_guid: &str, app_guid: &str) -> Reply<()>;

    /// Routes currently bound to the application, with their domains.
    async fn list_application_routes(&self, app_guid: &str) -> Reply<Vec<Route>>;
}
