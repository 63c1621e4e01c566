//! Request handlers.
//!
//! # Responsibilities
//! - Answer preflights locally
//! - Gate, decode and forward gateway POSTs
//! - Report liveness on `/health`
//!
//! # Design Decisions
//! - The origin decision comes first; a denied POST is never forwarded
//! - Body rejections (too large, unreadable) are answered with the error envelope
//! - Every answered POST except a denial carries the CORS headers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::forward::{Forwarder, Outcome, QueryParams};
use crate::http::request::{declared_origin, decode_json_body};
use crate::http::response::{error_response, outcome_response, ErrorCategory, ErrorEnvelope};
use crate::http::server::AppState;
use crate::security::{apply_cors_headers, apply_preflight_headers, apply_vary_origin};

/// `OPTIONS <gateway path>`: answered here, never forwarded.
pub async fn preflight(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let origin = declared_origin(&headers);
    let decision = state.gate.evaluate(origin.as_deref());

    let mut response = StatusCode::OK.into_response();
    apply_preflight_headers(response.headers_mut(), state.gate.allow_origin_for(&decision));
    response
}

/// `POST <gateway path>`: admit, forward once, classify, answer.
pub async fn forward(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let origin = declared_origin(&headers);
    let decision = state.gate.evaluate(origin.as_deref());
    if decision.is_denied() {
        // No allow-origin header: the browser blocks the response.
        let mut response = error_response(
            StatusCode::FORBIDDEN,
            ErrorEnvelope::new(ErrorCategory::Forbidden, "Origin not allowed"),
        );
        apply_vary_origin(response.headers_mut());
        return response;
    }

    let mut response = match body {
        Ok(body) => match decode_json_body(&body) {
            Ok(payload) => {
                let query = QueryParams::parse(raw_query.as_deref());
                let outcome = dispatch(Arc::clone(&state.forwarder), payload, query).await;
                outcome_response(outcome, state.forwarder.timeout())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected malformed JSON body");
                error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorEnvelope::new(
                        ErrorCategory::BadRequest,
                        format!("Invalid JSON body: {e}"),
                    ),
                )
            }
        },
        Err(rejection) => {
            body_rejection_response(&rejection, state.config.security.max_body_size)
        }
    };

    apply_cors_headers(response.headers_mut(), state.gate.allow_origin_for(&decision));
    response
}

fn body_rejection_response(rejection: &BytesRejection, limit: usize) -> Response {
    let status = rejection.status();
    tracing::debug!(%status, error = %rejection.body_text(), "Rejected request body");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        error_response(
            status,
            ErrorEnvelope::new(
                ErrorCategory::PayloadTooLarge,
                format!("Request body exceeds {limit} bytes"),
            ),
        )
    } else {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new(ErrorCategory::BadRequest, rejection.body_text()),
        )
    }
}

/// The upstream call runs on its own task, so a caller hanging up does not
/// cancel it.
async fn dispatch(
    forwarder: Arc<Forwarder>,
    payload: Value,
    query: QueryParams,
) -> Outcome {
    let task = tokio::spawn(async move { forwarder.forward(&payload, &query).await });
    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Forwarding task failed");
            Outcome::Unknown {
                detail: format!("forwarding task failed: {e}"),
            }
        }
    }
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

/// Fallback when no static directory is configured.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
