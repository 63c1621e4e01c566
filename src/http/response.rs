//! Response construction.
//!
//! # Responsibilities
//! - Map each forwarding `Outcome` to a status code and JSON body
//! - Build the stable error envelope `{error, message, status?}`
//!
//! # Design Decisions
//! - Successful upstream bodies pass through unchanged
//! - Upstream error responses keep the upstream status and body, wrapped
//! - Upstream timeouts result in 504 Gateway Timeout, connect failures in 502

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::forward::Outcome;

/// Error categories surfaced in the envelope's `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    #[serde(rename = "Proxy Error")]
    ProxyError,
    #[serde(rename = "Gateway Timeout")]
    GatewayTimeout,
    #[serde(rename = "Bad Gateway")]
    BadGateway,
    #[serde(rename = "Internal Server Error")]
    InternalServerError,
    #[serde(rename = "Bad Request")]
    BadRequest,
    #[serde(rename = "Forbidden")]
    Forbidden,
    #[serde(rename = "Payload Too Large")]
    PayloadTooLarge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorCategory,
    pub message: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorEnvelope {
    pub fn new(error: ErrorCategory, message: impl Into<Value>) -> Self {
        Self {
            error,
            message: message.into(),
            status: None,
        }
    }
}

/// Status and envelope as one response.
pub fn error_response(status: StatusCode, envelope: ErrorEnvelope) -> Response {
    (status, Json(envelope)).into_response()
}

/// Response for a forwarding outcome. CORS headers are added by the caller.
pub fn outcome_response(outcome: Outcome, timeout: Duration) -> Response {
    let status = outcome.status();
    match outcome {
        Outcome::Success { body, .. } => (status, Json(body)).into_response(),
        Outcome::UpstreamError { status, body } => error_response(
            status,
            ErrorEnvelope {
                error: ErrorCategory::ProxyError,
                message: body,
                status: Some(status.as_u16()),
            },
        ),
        Outcome::Timeout => error_response(
            status,
            ErrorEnvelope::new(
                ErrorCategory::GatewayTimeout,
                format!("Upstream did not respond within {}ms", timeout.as_millis()),
            ),
        ),
        Outcome::Unreachable => error_response(
            status,
            ErrorEnvelope::new(ErrorCategory::BadGateway, "Unable to reach upstream service"),
        ),
        Outcome::Unknown { detail } => error_response(
            status,
            ErrorEnvelope::new(ErrorCategory::InternalServerError, detail),
        ),
    }
}
