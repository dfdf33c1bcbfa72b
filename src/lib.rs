//! Route reconciliation for platform-as-a-service application pushes.
//!
//! Parses requested route strings against the platform's domains, works
//! out which routes exist, creates the missing ones, and binds them to the
//! application.

pub mod config;
pub mod observability;
pub mod remote;
pub mod routing;
pub mod warnings;

pub use config::ReconcilerConfig;
pub use remote::{CloudController, HttpCloudController, Reply};
pub use routing::{RouteError, RouteReconciler};
pub use warnings::Warnings;
