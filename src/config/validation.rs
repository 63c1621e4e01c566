//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check that every origin is in the exact form browsers send
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, HEALTH_PATH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cors.allowed_origins must not be empty")]
    EmptyAllowList,

    #[error("{field}: {value:?} is not an origin ({reason})")]
    InvalidOrigin {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("upstream.url: {value:?} is not an http(s) URL ({reason})")]
    InvalidUpstream { value: String, reason: String },

    #[error("upstream.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("gateway.path must be a literal path starting with '/', got {0:?}")]
    InvalidPath(String),

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address: {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check the whole config, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::EmptyAllowList);
    }
    for origin in &config.cors.allowed_origins {
        if let Err(reason) = check_origin(origin) {
            errors.push(ValidationError::InvalidOrigin {
                field: "cors.allowed_origins",
                value: origin.clone(),
                reason,
            });
        }
    }
    if let Some(fallback) = &config.cors.fallback_origin {
        if let Err(reason) = check_origin(fallback) {
            errors.push(ValidationError::InvalidOrigin {
                field: "cors.fallback_origin",
                value: fallback.clone(),
                reason,
            });
        }
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUpstream {
            value: config.upstream.url.clone(),
            reason: format!("unsupported scheme {}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUpstream {
            value: config.upstream.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if !is_literal_path(&config.gateway.path) {
        errors.push(ValidationError::InvalidPath(config.gateway.path.clone()));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_socket_addr().is_none()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The gateway path is mounted verbatim next to `/health`, so it must be
/// free of route captures (`:x`, `*x`, `{x}`).
fn is_literal_path(path: &str) -> bool {
    path.starts_with('/')
        && path != HEALTH_PATH
        && !path.contains(['{', '}'])
        && !path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

/// An origin must equal its own serialization: `scheme://host[:port]`,
/// lowercase host, no default port, no path.
fn check_origin(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {}", url.scheme()));
    }
    let serialized = url.origin().ascii_serialization();
    if serialized != value {
        return Err(format!("expected {serialized}"));
    }
    Ok(())
}
