//! Applying a desired route set: create, bind, unbind.
//!
//! # Responsibilities
//! - Create every desired route that has no remote identifier yet
//! - Bind routes that are desired but not currently bound
//! - Unbind every currently bound route
//!
//! # Design Decisions
//! - Calls are issued one at a time, in input order
//! - The first failure stops the loop; work already done stays done (no
//!   rollback, re-running the pass is the recovery path)
//! - Binding takes [`Route`]s only, so an uncreated route cannot be bound

use std::collections::HashSet;

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::reconciler::RouteReconciler;
use crate::routing::types::{DesiredRoute, Route};
use crate::warnings::Warnings;

impl RouteReconciler {
    /// Create the missing entries of `desired`, preserving order.
    ///
    /// Returns the fully created set and whether any create call was issued.
    pub async fn create_missing_routes(
        &self,
        desired: Vec<DesiredRoute>,
        warnings: &mut Warnings,
    ) -> RouteResult<(Vec<Route>, bool)> {
        let mut created_any = false;
        let mut routes = Vec::with_capacity(desired.len());

        for entry in desired {
            let spec = match entry {
                DesiredRoute::Existing(route) => {
                    routes.push(route);
                    continue;
                }
                DesiredRoute::Missing(spec) => spec,
            };

            let generate_port = spec.wants_random_port();
            tracing::info!(route = %spec, generate_port, "Creating route");
            created_any = true;
            let route = self
                .controller
                .create_route(&spec, generate_port)
                .await
                .record(warnings)?;
            routes.push(route);
        }

        Ok((routes, created_any))
    }

    /// Bind every route of `desired` that is not in `current`.
    ///
    /// On success the new current set equals `desired`; the flag tells
    /// whether any bind call was issued.
    pub async fn map_routes(
        &self,
        app_guid: &str,
        current: &[Route],
        desired: &[Route],
        warnings: &mut Warnings,
    ) -> RouteResult<(Vec<Route>, bool)> {
        let bound: HashSet<_> = current.iter().map(Route::key).collect();
        let mut bound_any = false;

        for route in desired.iter().filter(|route| !bound.contains(&route.key())) {
            tracing::info!(route = %route, app_guid = %app_guid, "Binding route");
            bound_any = true;
            self.controller
                .bind_route_to_application(&route.guid, app_guid)
                .await
                .record(warnings)
                .map_err(|e| RouteError::for_route(e, || route.fqdn()))?;
        }

        Ok((desired.to_vec(), bound_any))
    }

    /// Unbind every route in `current`. On success nothing is left bound.
    pub async fn unmap_routes(
        &self,
        app_guid: &str,
        current: &[Route],
        warnings: &mut Warnings,
    ) -> RouteResult<Vec<Route>> {
        for route in current {
            tracing::info!(route = %route, app_guid = %app_guid, "Unbinding route");
            self.controller
                .unbind_route_from_application(&route.guid, app_guid)
                .await
                .record(warnings)?;
        }
        Ok(Vec::new())
    }
}
