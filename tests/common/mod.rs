//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::RawQuery,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use wisekingson_gateway::config::GatewayConfig;
use wisekingson_gateway::lifecycle::shutdown::wait as wait_for_shutdown;
use wisekingson_gateway::{HttpServer, Shutdown};

pub const ALLOWED_ORIGIN: &str = "https://wisekingson.com";

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Received {
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A running mock upstream. Requests it receives are recorded in order.
pub struct MockUpstream {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}/exec", self.addr)
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

/// Start a programmable upstream on an ephemeral port.
///
/// `f` receives the raw query and decoded JSON body of each `POST /exec`
/// and returns the status and raw body to answer with.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(Option<String>, Value) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    let app = Router::new()
        .route(
            "/exec",
            post(move |RawQuery(query): RawQuery, headers: HeaderMap, body: Bytes| {
                let f = f.clone();
                let log = log.clone();
                async move {
                    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                    log.lock().unwrap().push(Received {
                        query: query.clone(),
                        headers,
                        body: body.clone(),
                    });
                    let (status, text) = f(query, body).await;
                    (
                        StatusCode::from_u16(status).unwrap(),
                        [(header::CONTENT_TYPE, "application/json")],
                        text,
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/moved",
            post(|| async { (StatusCode::FOUND, [(header::LOCATION, "/redirected")]) }),
        )
        .route("/redirected", get(|| async { r#"{"followed":true}"# }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, received }
}

/// Upstream that always answers `status` with `body`.
pub async fn start_mock_upstream(status: u16, body: &'static str) -> MockUpstream {
    start_programmable_upstream(move |_, _| async move { (status, body.to_string()) }).await
}

/// An address nothing is listening on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config pointed at `upstream_url`, admitting only [`ALLOWED_ORIGIN`].
pub fn gateway_config(upstream_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.url = upstream_url.to_string();
    config.upstream.system_proxy = false;
    config.cors.allowed_origins = vec![ALLOWED_ORIGIN.to_string()];
    config
}

/// A gateway running on an ephemeral port. Stops when dropped.
pub struct RunningGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningGateway {
    pub fn endpoint(&self) -> String {
        format!("http://{}/wisekingson", self.addr)
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = wait_for_shutdown(shutdown.subscribe());
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    RunningGateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
