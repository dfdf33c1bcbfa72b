//! Reconciliation errors.

use thiserror::Error;

use crate::remote::RemoteError;

/// Fatal outcomes of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No known domain is a suffix of the route's host name.
    #[error("The route {route} did not match any existing domains.")]
    NoMatchingDomain { route: String },

    /// A port was given for an HTTP domain.
    #[error("Invalid HTTP route settings for domain {domain}: port cannot be specified")]
    InvalidHttpRouteSettings { domain: String },

    /// A host or path was given for a TCP domain.
    #[error("Invalid TCP route settings for domain {domain}: host and path cannot be specified")]
    InvalidTcpRouteSettings { domain: String },

    /// The `:port` suffix is not a valid port number.
    #[error("Invalid port in route {route}")]
    InvalidPort { route: String },

    /// An explicitly named domain does not exist.
    #[error("Domain {name} not found")]
    DomainNotFound { name: String },

    /// The organization has no domain to build a default route on.
    #[error("No default domain exists for organization {org_guid}")]
    NoDefaultDomain { org_guid: String },

    /// The route is owned by another space.
    #[error("Route {route} has been registered to another space.")]
    RouteInDifferentSpace { route: String },

    /// Any other remote failure, passed through verbatim.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl RouteError {
    /// Translate a remote failure that concerns one route.
    ///
    /// Ownership by another space is reported under the route's
    /// `host.domain` name, whichever remote call detected it.
    pub(crate) fn for_route(error: RemoteError, fqdn: impl FnOnce() -> String) -> Self {
        match error {
            RemoteError::RouteInDifferentSpace { .. } => {
                RouteError::RouteInDifferentSpace { route: fqdn() }
            }
            other => other.into(),
        }
    }
}

/// Result type for engine operations.
pub type RouteResult<T> = Result<T, RouteError>;
