//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by outcome, status
//! - `gateway_forward_duration_seconds` (histogram): upstream latency by outcome
//! - `gateway_cors_denied_total` (counter): requests from origins off the allow-list
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is opt-in and listens on its own address

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::forward::Outcome;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one forwarded request.
pub fn record_forward(outcome: &Outcome, start: Instant) {
    let label = outcome.label();
    let status = outcome.status().as_u16().to_string();

    metrics::counter!("gateway_requests_total", "outcome" => label, "status" => status).increment(1);
    metrics::histogram!("gateway_forward_duration_seconds", "outcome" => label)
        .record(start.elapsed().as_secs_f64());
}
