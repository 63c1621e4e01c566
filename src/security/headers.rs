//! CORS response headers.
//!
//! # Responsibilities
//! - Attach the cross-origin headers to forwarded and error responses
//! - Add the preflight-only caching directive
//!
//! # Design Decisions
//! - Allow-origin is the echoed origin, else the configured fallback, else omitted
//! - `Vary: Origin` goes on every response whose allow-origin depends on the request

use axum::http::{header, HeaderMap, HeaderValue};

pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
/// Preflight results are cached for 24 hours.
pub const PREFLIGHT_MAX_AGE_SECS: u32 = 86_400;

/// Headers common to preflight and actual responses.
///
/// An `allow_origin` that is not a valid header value is dropped.
pub fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: Option<&str>) {
    if let Some(value) = allow_origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    apply_vary_origin(headers);
}

/// `Vary: Origin` alone, for responses that carry no CORS grant.
pub fn apply_vary_origin(headers: &mut HeaderMap) {
    headers.append(header::VARY, HeaderValue::from_static("origin"));
}

/// Full preflight header set.
pub fn apply_preflight_headers(headers: &mut HeaderMap, allow_origin: Option<&str>) {
    apply_cors_headers(headers, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from(PREFLIGHT_MAX_AGE_SECS),
    );
}
