//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → CLI / environment overrides (PORT, GOOGLE_SCRIPT_URL, ...)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc with the origin gate and the forwarder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{resolve_config, ConfigError, ConfigOverrides};
pub use schema::{
    CorsConfig, EndpointConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    SecurityConfig, SiteConfig, UpstreamConfig, HEALTH_PATH,
};
pub use validation::{validate_config, ValidationError};
