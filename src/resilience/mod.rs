//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (one deadline for the whole exchange)
//!     → on expiry: classified as a timeout, never retried
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: the upstream's side effects are unknown, so one call per request

pub mod timeouts;

pub use timeouts::{with_deadline, DeadlineElapsed};
