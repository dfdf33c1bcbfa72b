//! HTTP client against a programmable control plane backend.

mod common;

use std::net::SocketAddr;

use serde_json::json;

use common::{http_domain, start_programmable_backend, CannedResponse, RecordedRequest};
use route_reconciler::config::{ApiConfig, TimeoutConfig};
use route_reconciler::remote::{CloudController, HttpCloudController, RemoteError};
use route_reconciler::routing::{RouteSpec, RouterGroupType};

fn client(addr: SocketAddr) -> HttpCloudController {
    let api = ApiConfig {
        endpoint: format!("http://{}", addr),
        ..ApiConfig::default()
    };
    HttpCloudController::new(&api, &TimeoutConfig::default(), "secret".into()).unwrap()
}

fn ok(body: serde_json::Value) -> CannedResponse {
    (200, Vec::new(), body.to_string())
}

fn page(next_url: Option<&str>, resources: serde_json::Value) -> serde_json::Value {
    json!({ "next_url": next_url, "resources": resources })
}

fn domain_resource(guid: &str, name: &str, router_group_type: Option<&str>) -> serde_json::Value {
    json!({
        "metadata": { "guid": guid },
        "entity": { "name": name, "router_group_type": router_group_type }
    })
}

fn route_resource(guid: &str, host: &str, domain_guid: &str, space_guid: &str) -> serde_json::Value {
    json!({
        "metadata": { "guid": guid },
        "entity": {
            "host": host,
            "path": "",
            "port": null,
            "domain_guid": domain_guid,
            "space_guid": space_guid
        }
    })
}

fn targets(requests: &std::sync::Mutex<Vec<RecordedRequest>>) -> Vec<String> {
    requests.lock().unwrap().iter().map(|r| r.target.clone()).collect()
}

#[tokio::test]
async fn test_resolve_domains_follows_pages_and_collects_warnings() {
    let (addr, requests) = start_programmable_backend(|request: &RecordedRequest| {
        if request.target.contains("page=2") {
            ok(page(None, json!([domain_resource("d2", "b.a.com", None)])))
        } else if request.target.starts_with("/v2/organizations/org-guid/private_domains") {
            (
                200,
                vec![("X-Cf-Warnings".to_string(), "private+warning".to_string())],
                page(
                    Some("/v2/organizations/org-guid/private_domains?page=2"),
                    json!([domain_resource("d1", "a.com", None)]),
                )
                .to_string(),
            )
        } else if request.target.starts_with("/v2/shared_domains") {
            (
                200,
                vec![("X-Cf-Warnings".to_string(), "shared%20one,shared%20two".to_string())],
                page(None, json!([domain_resource("d3", "tcp.com", Some("tcp"))])).to_string(),
            )
        } else {
            (404, Vec::new(), "{}".to_string())
        }
    })
    .await;

    let reply = client(addr)
        .resolve_domains_by_name_and_org(
            &["a.com".to_string(), "b.a.com".to_string(), "tcp.com".to_string()],
            "org-guid",
        )
        .await;

    let domains = reply.result.unwrap();
    let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a.com", "b.a.com", "tcp.com"]);
    assert_eq!(domains[2].router_group_type, Some(RouterGroupType::Tcp));
    assert_eq!(
        reply.warnings.as_slice(),
        &["private warning", "shared one", "shared two"]
    );

    let seen = targets(&requests);
    assert_eq!(seen.len(), 3);
    assert!(seen[0].contains("q=name+IN+a.com%2Cb.a.com%2Ctcp.com"));
    assert!(seen[0].contains("results-per-page=50"));
    assert_eq!(
        requests.lock().unwrap()[0].authorization.as_deref(),
        Some("Bearer secret")
    );
}

#[tokio::test]
async fn test_find_route_in_space() {
    let (addr, requests) = start_programmable_backend(|_: &RecordedRequest| {
        ok(page(
            None,
            json!([
                route_resource("other-host", "api", "d1", "space-guid"),
                route_resource("r1", "www", "d1", "space-guid")
            ]),
        ))
    })
    .await;
    let spec = RouteSpec {
        host: "www".into(),
        domain: http_domain("d1", "a.com"),
        space_guid: "space-guid".into(),
        ..RouteSpec::default()
    };

    let route = client(addr).find_route_bound_to_space(&spec).await.result.unwrap();

    assert_eq!(route.guid, "r1");
    assert_eq!(route.domain.name, "a.com");
    let target = &targets(&requests)[0];
    assert!(target.starts_with("/v2/routes?"));
    assert!(target.contains("q=domain_guid%3Ad1"));
    assert!(target.contains("q=host%3Awww"));
}

#[tokio::test]
async fn test_find_route_missing_or_foreign() {
    let (addr, _) = start_programmable_backend(|request: &RecordedRequest| {
        if request.target.contains("host%3Aforeign") {
            ok(page(None, json!([route_resource("r9", "foreign", "d1", "elsewhere")])))
        } else {
            ok(page(None, json!([])))
        }
    })
    .await;
    let client = client(addr);
    let missing = RouteSpec {
        host: "missing".into(),
        domain: http_domain("d1", "a.com"),
        space_guid: "space-guid".into(),
        ..RouteSpec::default()
    };
    let foreign = RouteSpec {
        host: "foreign".into(),
        ..missing.clone()
    };

    assert_eq!(
        client.find_route_bound_to_space(&missing).await.result,
        Err(RemoteError::RouteNotFound)
    );
    assert_eq!(
        client.find_route_bound_to_space(&foreign).await.result,
        Err(RemoteError::RouteInDifferentSpace {
            route: "foreign.a.com".into()
        })
    );
}

#[tokio::test]
async fn test_create_route_with_generated_port() {
    let (addr, requests) = start_programmable_backend(|_: &RecordedRequest| {
        (
            201,
            Vec::new(),
            json!({
                "metadata": { "guid": "new-route" },
                "entity": {
                    "host": "",
                    "path": "",
                    "port": 61001,
                    "domain_guid": "d-tcp",
                    "space_guid": "space-guid"
                }
            })
            .to_string(),
        )
    })
    .await;
    let spec = RouteSpec {
        domain: http_domain("d-tcp", "tcp.a.com").with_router_group_type(RouterGroupType::Tcp),
        space_guid: "space-guid".into(),
        ..RouteSpec::default()
    };

    let route = client(addr).create_route(&spec, true).await.result.unwrap();

    assert_eq!(route.guid, "new-route");
    assert_eq!(route.port, Some(61001));
    assert_eq!(route.domain, spec.domain);

    let request = requests.lock().unwrap()[0].clone();
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/v2/routes?generate_port=true");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({ "domain_guid": "d-tcp", "space_guid": "space-guid" }));
}

#[tokio::test]
async fn test_bind_invalid_relation_is_route_in_other_space() {
    let (addr, requests) = start_programmable_backend(|_: &RecordedRequest| {
        (
            400,
            vec![("X-Cf-Warnings".to_string(), "bind+warning".to_string())],
            json!({
                "code": 1002,
                "description": "The requested app relation is invalid",
                "error_code": "CF-InvalidRelation"
            })
            .to_string(),
        )
    })
    .await;

    let reply = client(addr).bind_route_to_application("r1", "app-guid").await;

    assert_eq!(
        reply.result,
        Err(RemoteError::RouteInDifferentSpace { route: "r1".into() })
    );
    assert_eq!(reply.warnings.as_slice(), &["bind warning"]);
    let request = requests.lock().unwrap()[0].clone();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.target, "/v2/routes/r1/apps/app-guid");
}

#[tokio::test]
async fn test_unbind_and_server_error() {
    let (addr, requests) = start_programmable_backend(|request: &RecordedRequest| {
        if request.target.contains("/r1/") {
            (204, Vec::new(), String::new())
        } else {
            (500, Vec::new(), "upstream exploded".to_string())
        }
    })
    .await;
    let client = client(addr);

    assert_eq!(
        client.unbind_route_from_application("r1", "app-guid").await.result,
        Ok(())
    );
    assert_eq!(
        client.unbind_route_from_application("r2", "app-guid").await.result,
        Err(RemoteError::Api {
            status: 500,
            error_code: String::new(),
            description: "upstream exploded".into(),
        })
    );
    assert_eq!(requests.lock().unwrap()[0].method, "DELETE");
}

#[tokio::test]
async fn test_application_routes_resolve_each_domain_once() {
    let (addr, requests) = start_programmable_backend(|request: &RecordedRequest| {
        match request.target.split('?').next().unwrap_or_default() {
            "/v2/apps/app-guid/routes" => ok(page(
                None,
                json!([
                    route_resource("r1", "www", "d1", "space-guid"),
                    route_resource("r2", "api", "d1", "space-guid")
                ]),
            )),
            "/v2/private_domains/d1" => ok(domain_resource("d1", "private.com", None)),
            _ => (
                404,
                Vec::new(),
                json!({ "error_code": "CF-DomainNotFound", "description": "not found" }).to_string(),
            ),
        }
    })
    .await;

    let routes = client(addr)
        .list_application_routes("app-guid")
        .await
        .result
        .unwrap();

    let rendered: Vec<String> = routes.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["www.private.com", "api.private.com"]);
    assert_eq!(
        targets(&requests)
            .iter()
            .filter(|t| t.contains("_domains/d1"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reply = client(addr).list_organization_domains("org-guid").await;

    assert!(matches!(reply.result, Err(RemoteError::Transport(_))));
    assert!(reply.warnings.is_empty());
}

#[test]
fn test_missing_token_variable() {
    let api = ApiConfig {
        endpoint: "https://api.example.com".into(),
        token_env: "ROUTE_RECONCILER_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
        ..ApiConfig::default()
    };

    let err = HttpCloudController::from_config(&api, &TimeoutConfig::default())
        .err()
        .unwrap();

    assert_eq!(
        err,
        RemoteError::MissingToken("ROUTE_RECONCILER_TEST_TOKEN_THAT_IS_NEVER_SET".into())
    );
}

#[tokio::test]
async fn test_endpoint_base_path_is_kept() {
    let (addr, requests) = start_programmable_backend(|request: &RecordedRequest| {
        if request.target.contains("page=2") {
            ok(page(None, json!([domain_resource("d2", "b.com", None)])))
        } else if request.target.starts_with("/cf/v2/organizations/org-guid/private_domains") {
            ok(page(
                Some("/v2/organizations/org-guid/private_domains?page=2"),
                json!([domain_resource("d1", "a.com", None)]),
            ))
        } else if request.target.starts_with("/cf/v2/shared_domains") {
            ok(page(None, json!([])))
        } else {
            (404, Vec::new(), "{}".to_string())
        }
    })
    .await;
    let api = ApiConfig {
        endpoint: format!("http://{}/cf", addr),
        ..ApiConfig::default()
    };
    let client = HttpCloudController::new(&api, &TimeoutConfig::default(), "secret".into()).unwrap();

    let domains = client.list_organization_domains("org-guid").await.result.unwrap();

    assert_eq!(domains.len(), 2);
    let seen = targets(&requests);
    assert_eq!(
        seen,
        vec![
            "/cf/v2/organizations/org-guid/private_domains?results-per-page=50".to_string(),
            "/cf/v2/organizations/org-guid/private_domains?page=2".to_string(),
            "/cf/v2/shared_domains?results-per-page=50".to_string(),
        ]
    );
}
