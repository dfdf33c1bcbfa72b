//! Desired route calculation.
//!
//! # Data Flow
//! ```text
//! route strings + existing routes
//!     → drop strings already rendered by an existing route
//!     → one batched domain lookup for the remaining host names
//!     → segment every string (fails before any existence check)
//!     → existence check per distinct route key
//!     → existing routes followed by new entries, first occurrence wins
//! ```

use std::collections::HashSet;

use crate::remote::RemoteError;
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::reconciler::RouteReconciler;
use crate::routing::segmenter::{domain_candidate, segment, KnownDomains};
use crate::routing::types::{DesiredRoute, Route, RouteSpec};
use crate::warnings::Warnings;

impl RouteReconciler {
    /// Turn route strings into the desired route set for a space.
    ///
    /// `existing_routes` are reused verbatim and never re-checked remotely.
    /// Remote identifiers are filled in for routes that already exist in the
    /// space; the rest come back as [`DesiredRoute::Missing`].
    pub async fn calculate_routes(
        &self,
        routes: &[String],
        org_guid: &str,
        space_guid: &str,
        existing_routes: &[Route],
        warnings: &mut Warnings,
    ) -> RouteResult<Vec<DesiredRoute>> {
        let mut seen = HashSet::new();
        let mut calculated = Vec::with_capacity(existing_routes.len() + routes.len());
        for route in existing_routes {
            if seen.insert(route.key()) {
                calculated.push(DesiredRoute::Existing(route.clone()));
            }
        }

        let unknown = unknown_routes(routes, existing_routes);
        if unknown.is_empty() {
            tracing::debug!(known = calculated.len(), "All requested routes already known");
            return Ok(calculated);
        }

        let candidates = domain_candidates(&unknown);
        tracing::debug!(candidates = ?candidates, org_guid = %org_guid, "Resolving route domains");
        let resolved = self
            .controller
            .resolve_domains_by_name_and_org(&candidates, org_guid)
            .await
            .record(warnings)?;

        let mut domains: KnownDomains = existing_routes.iter().map(|r| r.domain.clone()).collect();
        domains.extend(resolved);

        let specs = unknown
            .iter()
            .map(|route| segment(route, &domains).map(|segments| segments.into_spec(space_guid)))
            .collect::<RouteResult<Vec<RouteSpec>>>()?;

        for spec in specs {
            if !seen.insert(spec.key()) {
                continue;
            }
            match self
                .controller
                .find_route_bound_to_space(&spec)
                .await
                .record(warnings)
            {
                Ok(route) => {
                    tracing::debug!(route = %route, guid = %route.guid, "Using existing route");
                    calculated.push(DesiredRoute::Existing(route));
                }
                Err(RemoteError::RouteNotFound) => {
                    tracing::debug!(route = %spec, "Route does not exist yet");
                    calculated.push(DesiredRoute::Missing(spec));
                }
                Err(e) => return Err(RouteError::for_route(e, || spec.fqdn())),
            }
        }

        Ok(calculated)
    }
}

/// Route strings that no existing route renders to, in input order.
fn unknown_routes<'a>(routes: &'a [String], existing_routes: &[Route]) -> Vec<&'a str> {
    let known: HashSet<String> = existing_routes.iter().map(ToString::to_string).collect();
    routes
        .iter()
        .map(String::as_str)
        .filter(|route| !known.contains(*route))
        .collect()
}

/// One lookup name per route string, deduplicated, first occurrence first.
fn domain_candidates(routes: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    routes
        .iter()
        .map(|route| domain_candidate(route))
        .filter(|candidate| seen.insert(*candidate))
        .map(str::to_string)
        .collect()
}
