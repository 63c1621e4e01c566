//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! approved request (JSON body + query)
//!     → query.rs (ordered pairs → upstream URL)
//!     → forwarder.rs (one POST, under one deadline)
//!     → outcome.rs (Success | UpstreamError | Timeout | Unreachable | Unknown)
//!     → http::response (status + JSON body)
//! ```

pub mod forwarder;
pub mod outcome;
pub mod query;

pub use forwarder::{Forwarder, ForwarderError};
pub use outcome::Outcome;
pub use query::QueryParams;
