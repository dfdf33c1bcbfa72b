//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the API endpoint and value ranges (timeouts > 0, page size)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReconcilerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ReconcilerConfig;

/// Largest page size the v2 API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.endpoint is required")]
    MissingEndpoint,

    #[error("api.endpoint '{endpoint}' is not a valid URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("api.endpoint scheme '{scheme}' is not supported (use http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("api.token_env must name an environment variable")]
    EmptyTokenVariable,

    #[error("api.page_size {0} is outside 1..=100")]
    PageSizeOutOfRange(u32),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a configuration, collecting every violation.
pub fn validate_config(config: &ReconcilerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let endpoint = config.api.endpoint.trim();
    if endpoint.is_empty() {
        errors.push(ValidationError::MissingEndpoint);
    } else {
        match Url::parse(endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            }),
            Err(e) => errors.push(ValidationError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if config.api.token_env.trim().is_empty() {
        errors.push(ValidationError::EmptyTokenVariable);
    }

    if config.api.page_size == 0 || config.api.page_size > MAX_PAGE_SIZE {
        errors.push(ValidationError::PageSizeOutOfRange(config.api.page_size));
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("request_secs", config.timeouts.request_secs),
        ("pass_secs", config.timeouts.pass_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
