//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! reconciler. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Control plane API settings.
    pub api: ApiConfig,

    /// Organization and space the routes live in.
    pub target: TargetConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Control plane API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API (e.g., "https://api.sys.example.com").
    pub endpoint: String,

    /// Name of the environment variable holding the bearer token.
    pub token_env: String,

    /// Accept invalid TLS certificates (development installations only).
    pub skip_tls_verification: bool,

    /// Results per page for list requests.
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token_env: "PLATFORM_ACCESS_TOKEN".to_string(),
            skip_tls_verification: false,
            page_size: 50,
        }
    }
}

/// Target organization and space.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TargetConfig {
    pub org_guid: Option<String>,
    pub space_guid: Option<String>,
}

/// Timeout configuration for remote calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Per-request timeout in seconds.
    pub request_secs: u64,

    /// Deadline for a whole reconciliation pass in seconds.
    pub pass_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            pass_secs: 300,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "route_reconciler=info".to_string(),
        }
    }
}
