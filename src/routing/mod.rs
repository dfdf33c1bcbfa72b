//! Route reconciliation engine.
//!
//! # Data Flow
//! ```text
//! route strings (CLI / manifest)
//!     → calculator.rs (domain lookup, segmenter.rs, existence checks)
//!     → Vec<DesiredRoute> (Existing | Missing)
//!     → applier.rs create_missing_routes → Vec<Route> (all with identifiers)
//!     → applier.rs map_routes (bind desired − current)
//!     → new current routes + warnings, or the first fatal error + warnings
//!
//! No routes requested:
//!     default_route.rs → single DesiredRoute → same create/map path
//! ```
//!
//! # Design Decisions
//! - Route identity is (domain, host, path, port); identifiers never take part
//! - Warnings accumulate in a `&mut Warnings` threaded through every step,
//!   separate from the error channel
//! - Route lifecycle is carried by types: `RouteSpec` (resolved, unchecked)
//!   → `DesiredRoute` (checked: Existing | Missing) → `Route` (created,
//!   bindable)
//! - First fatal error aborts the current batch; no compensating undo
//! - No state survives a call: snapshots in, snapshots out

pub mod applier;
pub mod calculator;
pub mod default_route;
pub mod error;
pub mod pass;
pub mod reconciler;
pub mod segmenter;
pub mod types;

pub use default_route::{hostname_for, AppDescriptor};
pub use error::{RouteError, RouteResult};
pub use pass::{PassOutcome, PassRequest};
pub use reconciler::RouteReconciler;
pub use segmenter::{segment, KnownDomains, RouteSegments};
pub use types::{Application, DesiredRoute, Domain, Route, RouteKey, RouteSpec, RouterGroupType};
