//! Remaining-budget arithmetic
//!
//! A [`Deadline`] is fixed when an operation starts. Every wait inside the
//! operation asks it for the remaining budget, so repeated polls (connect
//! retries, spurious wakeups, interrupted waits, TLS handshake rounds) share
//! one budget instead of each getting a fresh one.

use std::time::{Duration, Instant};

/// A monotonic start instant plus a time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Starts a deadline now.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Deadline {
            start: Instant::now(),
            budget,
        }
    }

    /// Starts a deadline from a millisecond timeout.
    ///
    /// Non-positive timeouts mean "block forever" and yield `None`.
    #[must_use]
    pub fn from_millis(timeout_ms: i64) -> Option<Self> {
        (timeout_ms > 0).then(|| Deadline::new(Duration::from_millis(timeout_ms.unsigned_abs())))
    }

    /// Time spent since the deadline started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Budget minus elapsed time, clamped at zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }

    /// Remaining budget in whole milliseconds, rounded up.
    #[must_use]
    pub fn remaining_millis(&self) -> i64 {
        i64::from(ceil_millis(self.remaining()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// Converts a duration to a poll timeout in milliseconds, rounding up so a
/// sub-millisecond remainder does not become a zero-length (non-blocking) wait.
pub(crate) fn ceil_millis(duration: Duration) -> i32 {
    let millis = duration.as_nanos().div_ceil(1_000_000);
    i32::try_from(millis).unwrap_or(i32::MAX)
}
