//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with a single deadline
//! - Cover connect, response headers and body read under that one budget
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

/// The deadline passed before the wrapped future finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline of {budget:?} elapsed")]
pub struct DeadlineElapsed {
    pub budget: Duration,
}

/// Run `fut` to completion or until `budget` elapses, whichever is first.
pub async fn with_deadline<F>(budget: Duration, fut: F) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    tokio::time::timeout(budget, fut)
        .await
        .map_err(|_| DeadlineElapsed { budget })
}
