//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine + transport produce:
//!     → tracing events (lookups at debug, creates/binds at info,
//!       remote warnings at warn)
//!     → one span per reconciliation pass, tagged with a pass_id
//!
//! Consumers:
//!     → logging.rs subscriber (stderr)
//! ```

pub mod logging;

pub use logging::init_logging;
