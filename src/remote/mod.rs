//! Remote-access collaborator.
//!
//! # Data Flow
//! ```text
//! routing engine
//!     → controller.rs (CloudController capability trait)
//!     → client.rs (HTTP implementation, one request per call)
//!     → Reply<T> { result, warnings } back to the engine
//! ```
//!
//! # Design Decisions
//! - Every call returns its warnings next to its result, success or not
//! - Not-found is a `RemoteError` variant, not a separate channel; callers
//!   decide whether it is fatal
//! - Dynamic dispatch (`Arc<dyn CloudController>`) so tests can swap in a
//!   recording fake

pub mod client;
pub mod controller;
pub mod error;
pub mod reply;
pub mod wire;

pub use client::HttpCloudController;
pub use controller::CloudController;
pub use error::{RemoteError, RemoteResult};
pub use reply::Reply;
