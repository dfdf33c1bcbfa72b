//! Default route generation.
//!
//! # Responsibilities
//! - Synthesize `<app-name>.<domain>` when no route was requested
//! - Pick the explicitly named domain, or the organization's first domain
//! - Reuse a known route or an existing remote route before proposing a new one
//!
//! # Design Decisions
//! - TCP domains get a bare route: no host, no port; the create step asks
//!   the remote side for a port
//! - Host names are derived from the app name: lower-cased, whitespace and
//!   underscores become `-`, anything outside `[a-z0-9-]` is dropped

use crate::remote::RemoteError;
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::reconciler::RouteReconciler;
use crate::routing::types::{Application, DesiredRoute, Domain, Route, RouteSpec};
use crate::warnings::Warnings;

/// What the caller knows about the application when generating its route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppDescriptor {
    pub name: String,
    /// Domain to use instead of the organization default.
    pub domain: Option<String>,
    /// Host to use instead of one derived from the name.
    pub host: Option<String>,
    /// Generate an apex route on the domain.
    pub no_hostname: bool,
}

impl AppDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether any setting overrides the plain `<name>.<default-domain>` route.
    pub fn has_route_overrides(&self) -> bool {
        self.domain.is_some() || self.host.is_some() || self.no_hostname
    }

    fn host_for(&self, domain: &Domain) -> String {
        if domain.is_tcp() || self.no_hostname {
            return String::new();
        }
        match &self.host {
            Some(host) => host.to_ascii_lowercase(),
            None => hostname_for(&self.name),
        }
    }
}

/// Derive a DNS-safe host label from an application name.
pub fn hostname_for(name: &str) -> String {
    let mut host = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() || c == '_' {
            if !in_separator {
                host.push('-');
                in_separator = true;
            }
            continue;
        }
        in_separator = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            host.push(c);
        }
    }
    host
}

impl RouteReconciler {
    /// Build the route an application gets when none was requested.
    ///
    /// A structurally equal entry of `known_routes` is returned without any
    /// remote existence check. A route that does not exist yet comes back as
    /// [`DesiredRoute::Missing`].
    pub async fn generate_default_route(
        &self,
        app: &AppDescriptor,
        org_guid: &str,
        space_guid: &str,
        known_routes: &[Route],
        warnings: &mut Warnings,
    ) -> RouteResult<DesiredRoute> {
        let domain = match &app.domain {
            Some(name) => self.named_domain(name, org_guid, warnings).await?,
            None => self.default_domain(org_guid, warnings).await?,
        };

        let spec = RouteSpec {
            host: app.host_for(&domain),
            domain,
            path: String::new(),
            port: None,
            space_guid: space_guid.to_string(),
        };

        let key = spec.key();
        if let Some(known) = known_routes.iter().find(|route| route.key() == key) {
            tracing::debug!(route = %known, "Default route already known");
            return Ok(DesiredRoute::Existing(known.clone()));
        }

        match self
            .controller
            .find_route_bound_to_space(&spec)
            .await
            .record(warnings)
        {
            Ok(route) => Ok(DesiredRoute::Existing(route)),
            Err(RemoteError::RouteNotFound) => Ok(DesiredRoute::Missing(spec)),
            Err(e) => Err(RouteError::for_route(e, || spec.fqdn())),
        }
    }

    /// Make sure the application is bound to `<app-name>.<default-domain>`,
    /// creating the route if needed.
    pub async fn create_and_map_default_application_route(
        &self,
        org_guid: &str,
        space_guid: &str,
        app: &Application,
        warnings: &mut Warnings,
    ) -> RouteResult<()> {
        let domain = self.default_domain(org_guid, warnings).await?;
        let spec = RouteSpec {
            host: AppDescriptor::named(&app.name).host_for(&domain),
            domain,
            path: String::new(),
            port: None,
            space_guid: space_guid.to_string(),
        };

        let bound = self
            .controller
            .list_application_routes(&app.guid)
            .await
            .record(warnings)?;
        let key = spec.key();
        if bound.iter().any(|route| route.key() == key) {
            tracing::info!(route = %spec, app = %app.name, "Default route already bound");
            return Ok(());
        }

        let route = match self
            .controller
            .find_route_bound_to_space(&spec)
            .await
            .record(warnings)
        {
            Ok(route) => route,
            Err(RemoteError::RouteNotFound) => {
                tracing::info!(route = %spec, "Creating default route");
                self.controller
                    .create_route(&spec, spec.wants_random_port())
                    .await
                    .record(warnings)?
            }
            Err(e) => return Err(RouteError::for_route(e, || spec.fqdn())),
        };

        tracing::info!(route = %route, app = %app.name, "Binding default route");
        self.controller
            .bind_route_to_application(&route.guid, &app.guid)
            .await
            .record(warnings)
            .map_err(|e| RouteError::for_route(e, || route.fqdn()))
    }

    async fn named_domain(
        &self,
        name: &str,
        org_guid: &str,
        warnings: &mut Warnings,
    ) -> RouteResult<Domain> {
        let domains = self
            .controller
            .resolve_domains_by_name_and_org(&[name.to_string()], org_guid)
            .await
            .record(warnings)?;
        domains
            .into_iter()
            .find(|domain| domain.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RouteError::DomainNotFound {
                name: name.to_string(),
            })
    }

    /// First domain of the organization, private domains before shared.
    async fn default_domain(&self, org_guid: &str, warnings: &mut Warnings) -> RouteResult<Domain> {
        let domains = self
            .controller
            .list_organization_domains(org_guid)
            .await
            .record(warnings)?;
        domains
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::NoDefaultDomain {
                org_guid: org_guid.to_string(),
            })
    }
}
