//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Open the per-request tracing span
//! - Extract the declared origin and decode the JSON body
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is decoded as JSON whatever `Content-Type` says; browsers
//!   posting `text/plain` to skip the preflight must still work

use std::borrow::Cow;

use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Issues a fresh UUID v4 for requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Span opened by the trace layer for each request.
pub fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// The `Origin` header, if any. Bytes that are not UTF-8 are replaced, so
/// such an origin can never match the allow-list.
pub fn declared_origin(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(header::ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}

/// Decode the inbound body. An empty body is an empty object.
pub fn decode_json_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes)
}
