//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ReconcilerConfig (validated, immutable)
//!     → CLI flags override target org/space
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Credentials never live in the file; only the name of the environment
//!   variable that holds them does

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ApiConfig, LoggingConfig, ReconcilerConfig, TargetConfig, TimeoutConfig};
pub use validation::ValidationError;
