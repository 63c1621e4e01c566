//! Outbound forwarding to the fixed upstream.
//!
//! # Responsibilities
//! - Build the target URL from the upstream base and the inbound query
//! - POST the inbound JSON with fixed Accept/Content-Type headers
//! - Bound the whole exchange by one deadline
//! - Classify whatever happens into an `Outcome`
//!
//! # Design Decisions
//! - One outbound call per inbound request; never retried
//! - Redirects are followed (Apps Script answers POSTs with 302)
//! - The client is pooled and shared; it holds no per-request state

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;
use crate::forward::outcome::{decode_body, Outcome};
use crate::forward::query::QueryParams;
use crate::observability::metrics;
use crate::resilience::with_deadline;

#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("invalid upstream URL: {0}")]
    InvalidUpstream(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream: Url,
    timeout: Duration,
}

impl Forwarder {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ForwarderError> {
        let upstream = Url::parse(&config.url)?;
        let timeout = config.timeout();

        let mut builder = reqwest::Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            upstream,
            timeout,
        })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn target_url(&self, query: &QueryParams) -> Url {
        query.append_to(&self.upstream)
    }

    /// Forward `body` once and classify the result.
    pub async fn forward(&self, body: &Value, query: &QueryParams) -> Outcome {
        let url = self.target_url(query);
        let start = Instant::now();

        let outcome = match with_deadline(self.timeout, self.exchange(url.clone(), body)).await {
            Ok(Ok((status, bytes))) => Outcome::from_response(status, decode_body(&bytes)),
            Ok(Err(e)) => {
                let outcome = Outcome::from_transport_error(&e);
                if matches!(outcome, Outcome::Unreachable) {
                    tracing::warn!(upstream = %url, error = %e, "Upstream unreachable");
                }
                outcome
            }
            Err(_) => Outcome::Timeout,
        };

        match &outcome {
            Outcome::Success { status, .. } => {
                tracing::debug!(upstream = %url, status = %status, "Upstream responded");
            }
            Outcome::UpstreamError { status, .. } => {
                tracing::info!(upstream = %url, status = %status, "Upstream returned error status");
            }
            Outcome::Timeout => {
                tracing::warn!(upstream = %url, timeout_ms = self.timeout.as_millis() as u64, "Upstream timed out");
            }
            Outcome::Unreachable => {}
            Outcome::Unknown { detail } => {
                tracing::error!(upstream = %url, detail = %detail, "Forwarding failed");
            }
        }

        metrics::record_forward(&outcome, start);
        outcome
    }

    async fn exchange(&self, url: Url, body: &Value) -> Result<(StatusCode, Bytes), reqwest::Error> {
        let response = self
            .client
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        Ok((status, bytes))
    }
}
