//! Engine entry point.

use std::sync::Arc;

use crate::remote::CloudController;

/// The route reconciliation engine.
///
/// Holds no state besides its remote collaborator: every operation works on
/// the snapshots it is given and keeps nothing between calls. Operations are
/// spread over the sibling modules:
/// - `calculate_routes` (calculator.rs)
/// - `generate_default_route`, `create_and_map_default_application_route`
///   (default_route.rs)
/// - `create_missing_routes`, `map_routes`, `unmap_routes` (applier.rs)
/// - `reconcile` (pass.rs)
#[derive(Clone)]
pub struct RouteReconciler {
    pub(crate) controller: Arc<dyn CloudController>,
}

impl RouteReconciler {
    pub fn new(controller: Arc<dyn CloudController>) -> Self {
        Self { controller }
    }
}

impl std::fmt::Debug for RouteReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteReconciler").finish_non_exhaustive()
    }
}
