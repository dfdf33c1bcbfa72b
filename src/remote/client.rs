//! HTTP implementation of [`CloudController`] against the v2 REST API.
//!
//! # Responsibilities
//! - Authenticate with a bearer token taken from the environment
//! - Follow paged list responses through `next_url`
//! - Decode `X-Cf-Warnings` into warnings on every response
//! - Map error bodies onto [`RemoteError`] variants
//!
//! No retries happen here; a failed request is reported as-is.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::schema::{ApiConfig, TimeoutConfig};
use crate::remote::controller::CloudController;
use crate::remote::error::{RemoteError, RemoteResult};
use crate::remote::reply::Reply;
use crate::remote::wire::{
    parse_warnings, CreateRouteRequest, DomainEntity, ErrorBody, Page, Resource, RouteEntity,
    INVALID_RELATION, WARNINGS_HEADER,
};
use crate::routing::types::{Domain, Route, RouteSpec};
use crate::warnings::Warnings;

/// Control plane client over HTTP.
#[derive(Clone)]
pub struct HttpCloudController {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
    page_size: u32,
}

impl HttpCloudController {
    /// Build a client from configuration, reading the token from the
    /// environment variable named in `api.token_env`.
    pub fn from_config(api: &ApiConfig, timeouts: &TimeoutConfig) -> RemoteResult<Self> {
        let token = std::env::var(&api.token_env)
            .map_err(|_| RemoteError::MissingToken(api.token_env.clone()))?;
        Self::new(api, timeouts, token)
    }

    /// Build a client with an explicit token.
    pub fn new(api: &ApiConfig, timeouts: &TimeoutConfig, token: String) -> RemoteResult<Self> {
        let endpoint = base_url(&api.endpoint).map_err(|e| {
            RemoteError::Transport(format!("Invalid API endpoint '{}': {}", api.endpoint, e))
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .danger_accept_invalid_certs(api.skip_tls_verification)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if api.skip_tls_verification {
            tracing::warn!(endpoint = %endpoint, "TLS certificate verification disabled");
        }

        Ok(Self {
            client,
            endpoint,
            token: token.trim_start_matches("bearer ").trim_start_matches("Bearer ").to_string(),
            page_size: api.page_size,
        })
    }

    /// Resolve `path` (relative, e.g. `v2/routes`) against the endpoint.
    fn url(&self, path: &str, query: &[(&str, String)]) -> RemoteResult<Url> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| RemoteError::Transport(format!("Invalid request path '{}': {}", path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send one request; the reply holds the raw body on 2xx.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Reply<String> {
        tracing::debug!(method = %method, url = %url, "API request");

        let mut request = self.client.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Reply::err(RemoteError::Transport(e.to_string()), Warnings::new()),
        };

        let warnings: Warnings = response
            .headers()
            .get_all(WARNINGS_HEADER)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_warnings)
            .collect::<Vec<_>>()
            .into();
        for warning in &warnings {
            tracing::warn!(warning = %warning, "API warning");
        }

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Reply::err(RemoteError::Transport(e.to_string()), warnings),
        };

        if status.is_success() {
            Reply::ok(text, warnings)
        } else {
            Reply::err(api_error(status, &text), warnings)
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Reply<T> {
        self.execute(Method::GET, url, None).await.and_then(|text| decode(&text))
    }

    /// Fetch every page of a list resource.
    async fn list<T: DeserializeOwned>(&self, mut url: Url) -> Reply<Vec<Resource<T>>> {
        url.query_pairs_mut()
            .append_pair("results-per-page", &self.page_size.to_string());

        let mut warnings = Warnings::new();
        let mut resources = Vec::new();
        loop {
            let page: Page<T> = match self.get(url).await.record(&mut warnings) {
                Ok(page) => page,
                Err(e) => return Reply::err(e, warnings),
            };
            resources.extend(page.resources);

            match page.next_url {
                // `next_url` is rooted at the API, not at the host.
                Some(next) => match self.endpoint.join(next.trim_start_matches('/')) {
                    Ok(next) => url = next,
                    Err(e) => {
                        return Reply::err(
                            RemoteError::InvalidResponse(format!("bad next_url '{}': {}", next, e)),
                            warnings,
                        )
                    }
                },
                None => break,
            }
        }
        Reply::ok(resources, warnings)
    }

    async fn list_domains(&self, path: &str, query: &[(&str, String)]) -> Reply<Vec<Domain>> {
        match self.url(path, query) {
            Ok(url) => self
                .list::<DomainEntity>(url)
                .await
                .map(|resources| resources.into_iter().map(Resource::into_domain).collect()),
            Err(e) => Reply::err(e, Warnings::new()),
        }
    }

    /// Look a domain up by identifier, shared domains first.
    async fn domain_by_guid(&self, guid: &str) -> Reply<Domain> {
        let mut warnings = Warnings::new();
        for collection in ["shared_domains", "private_domains"] {
            let url = match self.url(&format!("v2/{}/{}", collection, guid), &[]) {
                Ok(url) => url,
                Err(e) => return Reply::err(e, warnings),
            };
            match self.get::<Resource<DomainEntity>>(url).await.record(&mut warnings) {
                Ok(resource) => return Reply::ok(resource.into_domain(), warnings),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Reply::err(e, warnings),
            }
        }
        Reply::err(RemoteError::DomainNotFound { name: guid.to_string() }, warnings)
    }

    async fn route_app_relation(
        &self,
        method: Method,
        route_guid: &str,
        app_guid: &str,
    ) -> Reply<String> {
        match self.url(&format!("v2/routes/{}/apps/{}", route_guid, app_guid), &[]) {
            Ok(url) => self.execute(method, url, None).await,
            Err(e) => Reply::err(e, Warnings::new()),
        }
    }
}

#[async_trait]
impl CloudController for HttpCloudController {
    async fn resolve_domains_by_name_and_org(
        &self,
        names: &[String],
        org_guid: &str,
    ) -> Reply<Vec<Domain>> {
        if names.is_empty() {
            return Reply::ok(Vec::new(), Warnings::new());
        }
        let filter = [("q", format!("name IN {}", names.join(",")))];

        let mut warnings = Warnings::new();
        let private_path = format!("v2/organizations/{}/private_domains", org_guid);
        let mut domains = match self.list_domains(&private_path, &filter).await.record(&mut warnings) {
            Ok(domains) => domains,
            Err(e) => return Reply::err(e, warnings),
        };
        match self.list_domains("v2/shared_domains", &filter).await.record(&mut warnings) {
            Ok(shared) => domains.extend(shared),
            Err(e) => return Reply::err(e, warnings),
        }

        tracing::debug!(requested = names.len(), found = domains.len(), "Resolved domains");
        Reply::ok(domains, warnings)
    }

    async fn list_organization_domains(&self, org_guid: &str) -> Reply<Vec<Domain>> {
        let mut warnings = Warnings::new();
        let private_path = format!("v2/organizations/{}/private_domains", org_guid);
        let mut domains = match self.list_domains(&private_path, &[]).await.record(&mut warnings) {
            Ok(domains) => domains,
            Err(e) => return Reply::err(e, warnings),
        };
        match self.list_domains("v2/shared_domains", &[]).await.record(&mut warnings) {
            Ok(shared) => domains.extend(shared),
            Err(e) => return Reply::err(e, warnings),
        }
        Reply::ok(domains, warnings)
    }

    async fn find_route_bound_to_space(&self, route: &RouteSpec) -> Reply<Route> {
        let mut query = vec![
            ("q", format!("domain_guid:{}", route.domain.guid)),
            ("q", format!("host:{}", route.host)),
        ];
        if !route.path.is_empty() {
            query.push(("q", format!("path:{}", route.path)));
        }
        if let Some(port) = route.port {
            query.push(("q", format!("port:{}", port)));
        }
        let url = match self.url("v2/routes", &query) {
            Ok(url) => url,
            Err(e) => return Reply::err(e, Warnings::new()),
        };

        self.list::<RouteEntity>(url).await.and_then(|resources| {
            let found = resources.into_iter().find(|resource| {
                resource.entity.host == route.host
                    && resource.entity.path == route.path
                    && resource.entity.port == route.port
            });
            match found {
                Some(resource) if resource.entity.space_guid != route.space_guid => {
                    Err(RemoteError::RouteInDifferentSpace { route: route.to_string() })
                }
                Some(resource) => Ok(resource.into_route(route.domain.clone())),
                None => Err(RemoteError::RouteNotFound),
            }
        })
    }

    async fn create_route(&self, route: &RouteSpec, generate_port: bool) -> Reply<Route> {
        let query = if generate_port {
            vec![("generate_port", "true".to_string())]
        } else {
            Vec::new()
        };
        let url = match self.url("v2/routes", &query) {
            Ok(url) => url,
            Err(e) => return Reply::err(e, Warnings::new()),
        };
        let body = CreateRouteRequest {
            domain_guid: &route.domain.guid,
            space_guid: &route.space_guid,
            host: &route.host,
            path: &route.path,
            port: route.port,
        };
        let body = match serde_json::to_value(&body) {
            Ok(body) => body,
            Err(e) => return Reply::err(RemoteError::InvalidResponse(e.to_string()), Warnings::new()),
        };

        self.execute(Method::POST, url, Some(body))
            .await
            .and_then(|text| decode::<Resource<RouteEntity>>(&text))
            .map(|resource| resource.into_route(route.domain.clone()))
    }

    async fn bind_route_to_application(&self, route_guid: &str, app_guid: &str) -> Reply<()> {
        self.route_app_relation(Method::PUT, route_guid, app_guid)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                RemoteError::Api { error_code, .. } if error_code == INVALID_RELATION => {
                    RemoteError::RouteInDifferentSpace { route: route_guid.to_string() }
                }
                other => other,
            })
    }

    async fn unbind_route_from_application(&self, route_guid: &str, app_guid: &str) -> Reply<()> {
        self.route_app_relation(Method::DELETE, route_guid, app_guid)
            .await
            .map(|_| ())
    }

    async fn list_application_routes(&self, app_guid: &str) -> Reply<Vec<Route>> {
        let url = match self.url(&format!("v2/apps/{}/routes", app_guid), &[]) {
            Ok(url) => url,
            Err(e) => return Reply::err(e, Warnings::new()),
        };

        let mut warnings = Warnings::new();
        let resources = match self.list::<RouteEntity>(url).await.record(&mut warnings) {
            Ok(resources) => resources,
            Err(e) => return Reply::err(e, warnings),
        };

        // Domains are looked up once per call; nothing is kept across calls.
        let mut domains: HashMap<String, Domain> = HashMap::new();
        let mut routes = Vec::with_capacity(resources.len());
        for resource in resources {
            let domain_guid = resource.entity.domain_guid.clone();
            let domain = match domains.get(&domain_guid) {
                Some(domain) => domain.clone(),
                None => match self.domain_by_guid(&domain_guid).await.record(&mut warnings) {
                    Ok(domain) => {
                        domains.insert(domain_guid, domain.clone());
                        domain
                    }
                    Err(e) => return Reply::err(e, warnings),
                },
            };
            routes.push(resource.into_route(domain));
        }
        Reply::ok(routes, warnings)
    }
}

/// Parse the endpoint so request paths resolve below its base path.
fn base_url(endpoint: &str) -> Result<Url, url::ParseError> {
    if endpoint.ends_with('/') {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("{}/", endpoint))
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> RemoteResult<T> {
    serde_json::from_str(text).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}

fn api_error(status: StatusCode, text: &str) -> RemoteError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    RemoteError::Api {
        status: status.as_u16(),
        error_code: body.error_code,
        description: if body.description.is_empty() {
            text.to_string()
        } else {
            body.description
        },
    }
}
