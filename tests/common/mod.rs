//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use route_reconciler::remote::{CloudController, Reply};
use route_reconciler::routing::{Domain, Route, RouteSpec, RouterGroupType};

/// Programmable replies plus a record of the arguments of every call.
pub struct Stub<A, T> {
    inner: Mutex<StubState<A, T>>,
}

struct StubState<A, T> {
    calls: Vec<A>,
    default: Option<Reply<T>>,
    on_call: HashMap<usize, Reply<T>>,
}

impl<A: Clone, T: Clone + Default> Stub<A, T> {
    fn new() -> Self {
        Self {
            inner: Mutex::new(StubState {
                calls: Vec::new(),
                default: None,
                on_call: HashMap::new(),
            }),
        }
    }

    /// Reply used for every call without a specific reply.
    pub fn returns(&self, reply: Reply<T>) {
        self.inner.lock().unwrap().default = Some(reply);
    }

    /// Reply for the zero-based `index`th call.
    pub fn returns_on_call(&self, index: usize, reply: Reply<T>) {
        self.inner.lock().unwrap().on_call.insert(index, reply);
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    pub fn calls(&self) -> Vec<A> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn args_for_call(&self, index: usize) -> A {
        self.inner.lock().unwrap().calls[index].clone()
    }

    fn invoke(&self, args: A) -> Reply<T> {
        let mut state = self.inner.lock().unwrap();
        let index = state.calls.len();
        state.calls.push(args);
        state
            .on_call
            .get(&index)
            .or(state.default.as_ref())
            .cloned()
            .unwrap_or_else(|| Reply::ok(T::default(), Vec::<String>::new()))
    }
}

/// A `CloudController` that records calls and answers from stubs.
pub struct FakeCloudController {
    pub resolve_domains: Stub<(Vec<String>, String), Vec<Domain>>,
    pub organization_domains: Stub<String, Vec<Domain>>,
    pub find_route: Stub<RouteSpec, Route>,
    pub create_route: Stub<(RouteSpec, bool), Route>,
    pub bind_route: Stub<(String, String), ()>,
    pub unbind_route: Stub<(String, String), ()>,
    pub application_routes: Stub<String, Vec<Route>>,
    journal: Mutex<Vec<&'static str>>,
}

impl FakeCloudController {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            resolve_domains: Stub::new(),
            organization_domains: Stub::new(),
            find_route: Stub::new(),
            create_route: Stub::new(),
            bind_route: Stub::new(),
            unbind_route: Stub::new(),
            application_routes: Stub::new(),
            journal: Mutex::new(Vec::new()),
        })
    }

    /// Names of the operations called, in call order.
    pub fn journal(&self) -> Vec<&'static str> {
        self.journal.lock().unwrap().clone()
    }

    fn note(&self, operation: &'static str) {
        self.journal.lock().unwrap().push(operation);
    }
}

#[async_trait]
impl CloudController for FakeCloudController {
    async fn resolve_domains_by_name_and_org(
        &self,
        names: &[String],
        org_guid: &str,
    ) -> Reply<Vec<Domain>> {
        self.note("resolve_domains");
        self.resolve_domains.invoke((names.to_vec(), org_guid.to_string()))
    }

    async fn list_organization_domains(&self, org_guid: &str) -> Reply<Vec<Domain>> {
        self.note("organization_domains");
        self.organization_domains.invoke(org_guid.to_string())
    }

    async fn find_route_bound_to_space(&self, route: &RouteSpec) -> Reply<Route> {
        self.note("find_route");
        self.find_route.invoke(route.clone())
    }

    async fn create_route(&self, route: &RouteSpec, generate_port: bool) -> Reply<Route> {
        self.note("create_route");
        self.create_route.invoke((route.clone(), generate_port))
    }

    async fn bind_route_to_application(&self, route_guid: &str, app_guid: &str) -> Reply<()> {
        self.note("bind_route");
        self.bind_route.invoke((route_guid.to_string(), app_guid.to_string()))
    }

    async fn unbind_route_from_application(&self, route_guid: &str, app_guid: &str) -> Reply<()> {
        self.note("unbind_route");
        self.unbind_route.invoke((route_guid.to_string(), app_guid.to_string()))
    }

    async fn list_application_routes(&self, app_guid: &str) -> Reply<Vec<Route>> {
        self.note("application_routes");
        self.application_routes.invoke(app_guid.to_string())
    }
}

pub fn http_domain(guid: &str, name: &str) -> Domain {
    Domain::new(guid, name)
}

pub fn tcp_domain(guid: &str, name: &str) -> Domain {
    Domain::new(guid, name).with_router_group_type(RouterGroupType::Tcp)
}

pub fn route(guid: &str, host: &str, domain: Domain) -> Route {
    Route {
        guid: guid.into(),
        host: host.into(),
        domain,
        path: String::new(),
        port: None,
        space_guid: "some-space-guid".into(),
    }
}

pub fn spec(host: &str, domain: Domain) -> RouteSpec {
    RouteSpec {
        host: host.into(),
        domain,
        path: String::new(),
        port: None,
        space_guid: "some-space-guid".into(),
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A request as seen by the programmable backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string.
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// A canned response: status, extra headers, body.
pub type CannedResponse = (u16, Vec<(String, String)>, String);

/// Start a programmable HTTP backend on an ephemeral port.
///
/// Every request is recorded and answered by `f`.
pub async fn start_programmable_backend<F>(f: F) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(&RecordedRequest) -> CannedResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, headers, body) = f(&request);
                        recorded.lock().unwrap().push(request);

                        let mut response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                            status,
                            reason(status),
                            body.len()
                        );
                        for (name, value) in headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str("\r\n");
                        response.push_str(&body);
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, requests)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value),
                _ => {}
            }
        }
    }

    while buffer.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buffer[header_end..]).to_string();

    Some(RecordedRequest {
        method,
        target,
        authorization,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}
