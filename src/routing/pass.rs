//! One reconciliation pass for one application.
//!
//! # Data Flow
//! ```text
//! list_application_routes (seed current routes)
//!     → no_route:  unmap_routes → done
//!     → no routes requested: generate_default_route (unless already routed)
//!     → otherwise: calculate_routes
//!     → create_missing_routes
//!     → map_routes
//! ```
//!
//! Each step needs the previous one's output, so they run strictly in
//! sequence. A pass can be abandoned by dropping its future; whatever the
//! completed calls did remotely stays in place.

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::routing::default_route::AppDescriptor;
use crate::routing::error::RouteResult;
use crate::routing::reconciler::RouteReconciler;
use crate::routing::types::{DesiredRoute, Route};
use crate::warnings::Warnings;

/// Input of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct PassRequest {
    pub org_guid: String,
    pub space_guid: String,
    pub app_guid: String,
    pub app: AppDescriptor,
    /// Requested route strings. Empty means "use the default route".
    pub routes: Vec<String>,
    /// Unbind every route instead of reconciling.
    pub no_route: bool,
}

/// Route state of the application after a successful pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
    pub pass_id: Uuid,
    /// Routes bound to the application now.
    pub current_routes: Vec<Route>,
    pub routes_created: bool,
    pub routes_bound: bool,
    /// Number of routes unbound (only with `no_route`).
    pub routes_unbound: usize,
}

impl RouteReconciler {
    /// Run one reconciliation pass.
    pub async fn reconcile(
        &self,
        request: &PassRequest,
        warnings: &mut Warnings,
    ) -> RouteResult<PassOutcome> {
        let pass_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "reconciliation_pass",
            %pass_id,
            app_guid = %request.app_guid,
            space_guid = %request.space_guid,
        );
        self.run_pass(pass_id, request, warnings).instrument(span).await
    }

    async fn run_pass(
        &self,
        pass_id: Uuid,
        request: &PassRequest,
        warnings: &mut Warnings,
    ) -> RouteResult<PassOutcome> {
        let current = self
            .controller
            .list_application_routes(&request.app_guid)
            .await
            .record(warnings)?;
        tracing::info!(bound = current.len(), "Fetched application routes");

        if request.no_route {
            let unbound = current.len();
            let current_routes = self.unmap_routes(&request.app_guid, &current, warnings).await?;
            return Ok(PassOutcome {
                pass_id,
                current_routes,
                routes_created: false,
                routes_bound: false,
                routes_unbound: unbound,
            });
        }

        let desired = if !request.routes.is_empty() {
            self.calculate_routes(
                &request.routes,
                &request.org_guid,
                &request.space_guid,
                &current,
                warnings,
            )
            .await?
        } else if current.is_empty() || request.app.has_route_overrides() {
            let default = self
                .generate_default_route(
                    &request.app,
                    &request.org_guid,
                    &request.space_guid,
                    &current,
                    warnings,
                )
                .await?;
            with_current(&current, default)
        } else {
            tracing::info!("Application already routed, keeping current routes");
            current.iter().cloned().map(DesiredRoute::Existing).collect()
        };

        let (desired, routes_created) = self.create_missing_routes(desired, warnings).await?;
        let (current_routes, routes_bound) = self
            .map_routes(&request.app_guid, &current, &desired, warnings)
            .await?;

        tracing::info!(
            routes = current_routes.len(),
            routes_created,
            routes_bound,
            warnings = warnings.len(),
            "Reconciliation pass complete"
        );

        Ok(PassOutcome {
            pass_id,
            current_routes,
            routes_created,
            routes_bound,
            routes_unbound: 0,
        })
    }
}

/// Current routes followed by `extra`, unless `extra` is one of them.
fn with_current(current: &[Route], extra: DesiredRoute) -> Vec<DesiredRoute> {
    let mut desired: Vec<DesiredRoute> = current.iter().cloned().map(DesiredRoute::Existing).collect();
    let key = extra.key();
    if !desired.iter().any(|route| route.key() == key) {
        desired.push(extra);
    }
    desired
}
