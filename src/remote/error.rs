//! Remote-side failures.

use thiserror::Error;

/// Errors surfaced by a [`CloudController`](crate::remote::CloudController).
///
/// Not-found variants are regular outcomes for existence checks; callers
/// decide whether they are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No route with the requested settings exists.
    #[error("route not found")]
    RouteNotFound,

    /// No domain with the given name (or identifier) exists.
    #[error("domain {name} not found")]
    DomainNotFound { name: String },

    /// The route belongs to a space other than the target one.
    #[error("route {route} is bound to a different space")]
    RouteInDifferentSpace { route: String },

    /// The API answered with an error status.
    #[error("API error {status} ({error_code}): {description}")]
    Api {
        status: u16,
        error_code: String,
        description: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No access token was available for the API.
    #[error("missing access token: environment variable {0} is not set")]
    MissingToken(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RemoteError::RouteNotFound
                | RemoteError::DomainNotFound { .. }
                | RemoteError::Api { status: 404, .. }
        )
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;
