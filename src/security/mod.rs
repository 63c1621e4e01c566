//! Cross-origin admission subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → origin.rs (Origin header → CorsDecision)
//!     → Denied POST: rejected before forwarding
//!     → otherwise: headers.rs (attach CORS headers to whatever response is produced)
//! ```
//!
//! # Design Decisions
//! - Admission is a pure function of the Origin header and the allow-list
//! - Browsers enforce the real check; the gateway only decides which headers to send

pub mod headers;
pub mod origin;

pub use headers::{apply_cors_headers, apply_preflight_headers, apply_vary_origin};
pub use origin::{AllowList, CorsDecision, OriginGate};
