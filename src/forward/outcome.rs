//! Classification of a single upstream exchange.

use std::error::Error as StdError;

use axum::http::StatusCode;
use serde_json::Value;

/// Result of one forwarded call. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Upstream answered 2xx; status and body pass through.
    Success { status: StatusCode, body: Value },
    /// Upstream answered with a non-2xx status.
    UpstreamError { status: StatusCode, body: Value },
    /// No complete response within the deadline.
    Timeout,
    /// Name resolution or connection establishment failed.
    Unreachable,
    /// Anything else that went wrong while forwarding.
    Unknown { detail: String },
}

impl Outcome {
    pub fn from_response(status: StatusCode, body: Value) -> Self {
        if status.is_success() {
            Outcome::Success { status, body }
        } else {
            Outcome::UpstreamError { status, body }
        }
    }

    pub fn from_transport_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Outcome::Timeout
        } else if err.is_connect() {
            Outcome::Unreachable
        } else {
            Outcome::Unknown {
                detail: error_chain(err),
            }
        }
    }

    /// Status code the caller receives.
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Success { status, .. } | Outcome::UpstreamError { status, .. } => *status,
            Outcome::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Outcome::Unreachable => StatusCode::BAD_GATEWAY,
            Outcome::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::UpstreamError { .. } => "upstream_error",
            Outcome::Timeout => "timeout",
            Outcome::Unreachable => "unreachable",
            Outcome::Unknown { .. } => "unknown",
        }
    }
}

/// Decode an upstream body. Non-JSON text is kept as a JSON string;
/// an empty body becomes `null`.
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// `err` followed by each of its sources, joined with `": "`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
