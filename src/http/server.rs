//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID)
//! - Hand every path other than the gateway endpoint to the static collaborator
//! - Serve on a listener until shutdown

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, HEALTH_PATH};
use crate::forward::{Forwarder, ForwarderError};
use crate::http::handlers;
use crate::http::request::{request_span, MakeRequestUuidV4, X_REQUEST_ID};
use crate::security::OriginGate;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gate: Arc<OriginGate>,
    pub forwarder: Arc<Forwarder>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, ForwarderError> {
        let forwarder = Forwarder::from_config(&config.upstream)?;
        let gate = OriginGate::from_config(&config.cors);
        Ok(Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            forwarder: Arc::new(forwarder),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ForwarderError> {
        let state = AppState::new(config)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        let config = Arc::clone(&state.config);

        let router = Router::new()
            .route(
                config.gateway.path.as_str(),
                post(handlers::forward).options(handlers::preflight),
            )
            .route(HEALTH_PATH, get(handlers::health));

        let router = match &config.site.static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router.fallback(handlers::not_found),
        };

        router
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Router with state and middleware applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.state.config.gateway.path,
            upstream = %self.state.forwarder.upstream(),
            allowed_origins = ?self.state.gate.allow_list().origins(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
