use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, timeout_at};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// Deadline wrapper for a single async operation.
///
/// When the deadline passes first the wrapped future is dropped, which
/// aborts any in-flight request it owns; nothing it produces afterwards can
/// reach the caller.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    deadline: Instant,
}

impl TimeoutGuard {
    pub fn after(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
        }
    }

    pub fn at(deadline: Instant) -> Self {
        Self { deadline }
    }

    /// Never run past `cap`, even if our own budget would allow it.
    pub fn capped_at(self, cap: Instant) -> Self {
        Self {
            deadline: self.deadline.min(cap),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub async fn run<F>(self, operation: F) -> Result<F::Output, TimedOut>
    where
        F: Future,
    {
        let started = Instant::now();
        timeout_at(self.deadline, operation)
            .await
            .map_err(|_| TimedOut(started.elapsed()))
    }
}
