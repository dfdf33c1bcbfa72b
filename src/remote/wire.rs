//! JSON shapes of the v2 API.

use serde::{Deserialize, Serialize};

use crate::routing::types::{Domain, Route, RouterGroupType};

/// Header carrying comma-separated, URL-encoded warnings.
pub const WARNINGS_HEADER: &str = "X-Cf-Warnings";

/// Error code the API returns when an app and a route live in different
/// spaces.
pub const INVALID_RELATION: &str = "CF-InvalidRelation";

/// One page of a list response.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub next_url: Option<String>,
    pub resources: Vec<Resource<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Resource<T> {
    pub metadata: Metadata,
    pub entity: T,
}

#[derive(Debug, Deserialize)]
pub struct Metadata {
    pub guid: String,
}

#[derive(Debug, Deserialize)]
pub struct DomainEntity {
    pub name: String,
    #[serde(default)]
    pub router_group_type: Option<String>,
}

impl Resource<DomainEntity> {
    pub fn into_domain(self) -> Domain {
        let router_group_type = match self.entity.router_group_type.as_deref() {
            Some("tcp") => Some(RouterGroupType::Tcp),
            Some("http") => Some(RouterGroupType::Http),
            _ => None,
        };
        Domain {
            guid: self.metadata.guid,
            name: self.entity.name,
            router_group_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteEntity {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub domain_guid: String,
    pub space_guid: String,
}

impl Resource<RouteEntity> {
    pub fn into_route(self, domain: Domain) -> Route {
        Route {
            guid: self.metadata.guid,
            host: self.entity.host,
            domain,
            path: self.entity.path,
            port: self.entity.port,
            space_guid: self.entity.space_guid,
        }
    }
}

/// Body of `POST /v2/routes`.
#[derive(Debug, Serialize)]
pub struct CreateRouteRequest<'a> {
    pub domain_guid: &'a str,
    pub space_guid: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    pub host: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    pub path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

fn is_empty(value: &&str) -> bool {
    value.is_empty()
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub description: String,
    pub error_code: String,
}

/// Decode the value of [`WARNINGS_HEADER`].
pub fn parse_warnings(header: &str) -> Vec<String> {
    header
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            url::form_urlencoded::parse(part.as_bytes())
                .next()
                .map(|(decoded, _)| decoded.into_owned())
        })
        .collect()
}
