//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, Origin, JSON body)
//!     → handlers.rs (preflight | forward | health | static fallback)
//!     → security (CorsDecision, CORS headers)
//!     → forward (one upstream call → Outcome)
//!     → response.rs (Outcome → status + JSON)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ErrorCategory, ErrorEnvelope};
pub use server::{AppState, HttpServer};
