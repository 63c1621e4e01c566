//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and metrics from the validated configuration
//! - Build the server and bind its listener
//! - Serve until a shutdown signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use tokio::net::TcpListener;

use crate::config::{schema::DEFAULT_UPSTREAM_URL, GatewayConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::{self, metrics};

pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    observability::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        upstream_timeout_ms = config.upstream.timeout_ms,
        "Configuration loaded"
    );
    if config.upstream.url == DEFAULT_UPSTREAM_URL {
        tracing::warn!("GOOGLE_SCRIPT_URL not set; forwarding to the built-in default upstream");
    }

    if config.observability.metrics_enabled {
        if let Some(addr) = config.observability.metrics_socket_addr() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
