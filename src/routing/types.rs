//! Route and domain snapshots.
//!
//! Snapshots are taken from the remote side at the start of a pass and
//! discarded at its end. The only mutation a route goes through is gaining
//! a remote identifier once it has been created, which is expressed as a
//! type change from [`RouteSpec`] to [`Route`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability class of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterGroupType {
    Http,
    Tcp,
}

/// Read-only snapshot of a remote domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Domain {
    /// Remote identifier.
    pub guid: String,
    /// DNS-like name, e.g. `apps.example.com`.
    pub name: String,
    /// `None` for plain domains, which behave like HTTP domains.
    pub router_group_type: Option<RouterGroupType>,
}

impl Domain {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            router_group_type: None,
        }
    }

    pub fn with_router_group_type(mut self, router_group_type: RouterGroupType) -> Self {
        self.router_group_type = Some(router_group_type);
        self
    }

    pub fn is_tcp(&self) -> bool {
        self.router_group_type == Some(RouterGroupType::Tcp)
    }
}

/// The identity of a route for every set operation.
///
/// Two routes are the same route iff their keys are equal; remote
/// identifiers and space ownership do not take part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub domain_guid: String,
    pub host: String,
    pub path: String,
    pub port: Option<u16>,
}

/// A route that has been segmented and resolved against a domain but does
/// not (yet) carry a remote identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteSpec {
    /// Empty for apex routes and for TCP domains.
    pub host: String,
    pub domain: Domain,
    /// Empty or starting with `/`. Always empty on TCP domains.
    pub path: String,
    /// Only set on TCP domains. `None` on a TCP domain asks the remote side
    /// to allocate a port.
    pub port: Option<u16>,
    /// Owning space.
    pub space_guid: String,
}

impl RouteSpec {
    pub fn key(&self) -> RouteKey {
        RouteKey {
            domain_guid: self.domain.guid.clone(),
            host: self.host.clone(),
            path: self.path.clone(),
            port: self.port,
        }
    }

    /// Whether creating this route should let the remote side pick a port.
    pub fn wants_random_port(&self) -> bool {
        self.domain.is_tcp() && self.host.is_empty() && self.path.is_empty() && self.port.is_none()
    }

    /// `host.domain`, or just `domain` for apex routes.
    pub fn fqdn(&self) -> String {
        fqdn(&self.host, &self.domain.name)
    }

    /// Attach the identifier the remote side assigned to this route.
    pub fn into_route(self, guid: impl Into<String>) -> Route {
        Route {
            guid: guid.into(),
            host: self.host,
            domain: self.domain,
            path: self.path,
            port: self.port,
            space_guid: self.space_guid,
        }
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, &self.host, &self.domain.name, self.port, &self.path)
    }
}

/// A route that exists on the remote side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Route {
    pub guid: String,
    pub host: String,
    pub domain: Domain,
    pub path: String,
    pub port: Option<u16>,
    pub space_guid: String,
}

impl Route {
    pub fn key(&self) -> RouteKey {
        RouteKey {
            domain_guid: self.domain.guid.clone(),
            host: self.host.clone(),
            path: self.path.clone(),
            port: self.port,
        }
    }

    pub fn fqdn(&self) -> String {
        fqdn(&self.host, &self.domain.name)
    }

    /// Drop the remote identifier, keeping the route settings.
    pub fn to_spec(&self) -> RouteSpec {
        RouteSpec {
            host: self.host.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            port: self.port,
            space_guid: self.space_guid.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, &self.host, &self.domain.name, self.port, &self.path)
    }
}

/// An entry of the desired route set after existence checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "route", rename_all = "snake_case")]
pub enum DesiredRoute {
    /// Already present remotely, identifier known.
    Existing(Route),
    /// Checked and absent; has to be created before it can be bound.
    Missing(RouteSpec),
}

impl DesiredRoute {
    pub fn key(&self) -> RouteKey {
        match self {
            DesiredRoute::Existing(route) => route.key(),
            DesiredRoute::Missing(spec) => spec.key(),
        }
    }

    pub fn guid(&self) -> Option<&str> {
        match self {
            DesiredRoute::Existing(route) => Some(&route.guid),
            DesiredRoute::Missing(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, DesiredRoute::Missing(_))
    }
}

impl fmt::Display for DesiredRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredRoute::Existing(route) => route.fmt(f),
            DesiredRoute::Missing(spec) => spec.fmt(f),
        }
    }
}

/// The application whose routes are being reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Application {
    pub guid: String,
    pub name: String,
}

fn fqdn(host: &str, domain: &str) -> String {
    if host.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", host, domain)
    }
}

fn render(
    f: &mut fmt::Formatter<'_>,
    host: &str,
    domain: &str,
    port: Option<u16>,
    path: &str,
) -> fmt::Result {
    if !host.is_empty() {
        write!(f, "{}.", host)?;
    }
    f.write_str(domain)?;
    if let Some(port) = port {
        write!(f, ":{}", port)?;
    }
    f.write_str(path)
}
