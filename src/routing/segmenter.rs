//! Route string segmentation.
//!
//! # Responsibilities
//! - Split `host.domain[:port][/path]` into its parts
//! - Pick the domain by longest suffix match over the known domains
//! - Reject settings that do not fit the domain's routing group
//!
//! # Design Decisions
//! - Pure: works only on the domain snapshot it is handed, no I/O
//! - Domain names compare case-insensitively (DNS semantics); hosts are
//!   lower-cased so route identity does not depend on input case
//! - A bare `/` path is treated as no path

use std::collections::HashMap;

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::types::{Domain, RouteSpec};

/// Domains available to a calculation pass, keyed by lower-cased name.
#[derive(Debug, Clone, Default)]
pub struct KnownDomains {
    by_name: HashMap<String, Domain>,
}

impl KnownDomains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain. A later insert for the same name replaces the earlier.
    pub fn insert(&mut self, domain: Domain) {
        self.by_name.insert(domain.name.to_ascii_lowercase(), domain);
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.by_name.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<Domain> for KnownDomains {
    fn from_iter<I: IntoIterator<Item = Domain>>(iter: I) -> Self {
        let mut known = Self::new();
        for domain in iter {
            known.insert(domain);
        }
        known
    }
}

impl Extend<Domain> for KnownDomains {
    fn extend<I: IntoIterator<Item = Domain>>(&mut self, iter: I) {
        for domain in iter {
            self.insert(domain);
        }
    }
}

/// The parts of a route string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSegments {
    pub host: String,
    pub domain: Domain,
    pub path: String,
    /// A single port. Port ranges are not supported.
    pub port: Option<u16>,
}

impl RouteSegments {
    pub fn into_spec(self, space_guid: &str) -> RouteSpec {
        RouteSpec {
            host: self.host,
            domain: self.domain,
            path: self.path,
            port: self.port,
            space_guid: space_guid.to_string(),
        }
    }
}

/// The dotted host name of a route string: everything before the first
/// `/` or `:`.
///
/// This is the single name sent for batch domain resolution. For
/// multi-level domains it can differ from the domain [`segment`] finally
/// picks, so resolution may miss a shorter domain that was never asked for.
pub fn domain_candidate(route: &str) -> &str {
    match route.find(['/', ':']) {
        Some(index) => &route[..index],
        None => route,
    }
}

/// Split `route` against `domains`.
pub fn segment(route: &str, domains: &KnownDomains) -> RouteResult<RouteSegments> {
    let (authority, path) = match route.find('/') {
        Some(index) => (&route[..index], &route[index..]),
        None => (route, ""),
    };
    let (hostname, port) = match authority.find(':') {
        Some(index) => (&authority[..index], Some(&authority[index + 1..])),
        None => (authority, None),
    };

    let (host, domain) = longest_suffix_match(hostname, domains).ok_or_else(|| {
        RouteError::NoMatchingDomain {
            route: hostname.to_string(),
        }
    })?;

    if domain.is_tcp() {
        if !host.is_empty() || !path.is_empty() {
            return Err(RouteError::InvalidTcpRouteSettings {
                domain: domain.name.clone(),
            });
        }
        let port = match port {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| RouteError::InvalidPort {
                route: route.to_string(),
            })?),
            None => None,
        };
        return Ok(RouteSegments {
            host,
            domain: domain.clone(),
            path: String::new(),
            port,
        });
    }

    if port.is_some() {
        return Err(RouteError::InvalidHttpRouteSettings {
            domain: domain.name.clone(),
        });
    }

    Ok(RouteSegments {
        host,
        domain: domain.clone(),
        path: if path == "/" { String::new() } else { path.to_string() },
        port: None,
    })
}

/// Find the longest known domain that is a dotted suffix of `hostname` and
/// return the remaining prefix, lower-cased, as host.
fn longest_suffix_match<'a>(hostname: &str, domains: &'a KnownDomains) -> Option<(String, &'a Domain)> {
    if hostname.is_empty() {
        return None;
    }
    let labels: Vec<&str> = hostname.split('.').collect();
    // Suffixes shrink as `start` grows, so the first hit is the longest.
    (0..labels.len()).find_map(|start| {
        let suffix = labels[start..].join(".");
        domains
            .get(&suffix)
            .map(|domain| (labels[..start].join(".").to_ascii_lowercase(), domain))
    })
}
