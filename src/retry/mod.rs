//! # Retry & Backoff Control
//!
//! Decides when an unresolved order may be polled again and how its backoff state
//! changes after a failed or rate-limited poll.
//!
//! ## Eligibility
//!
//! An entry becomes eligible at
//!
//! ```text
//! last_checked + max(retry_after, poll_interval)
//! ```
//!
//! `retry_after` is set only by the oracle's 429 responses. `poll_interval` is the
//! minimum spacing between two polls of the same order; with a zero interval the
//! rule reduces to "not before `last_checked + retry_after`".
//!
//! ## Outcomes
//!
//! | Poll outcome | `retry_count` | `retry_after` | `last_checked` |
//! |---|---|---|---|
//! | Rate limited | unchanged | oracle's value | now |
//! | Transient error | +1 | cleared | now |
//!
//! Transient failures do not grow the delay. When `max_attempts` is set, an entry
//! whose `retry_count` reaches it is reported as [`RetryVerdict::Exhausted`] and
//! leaves the pending queue.

use crate::model::OrderQueueEntry;
use std::time::Duration;
use tokio::time::Instant;

/// Longest quiet period honored from the oracle. Larger windows are cut to this.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// `base + delay`, with `delay` capped at [`MAX_RETRY_AFTER`].
fn deadline(base: Instant, delay: Duration) -> Instant {
    base + delay.min(MAX_RETRY_AFTER)
}

/// Knobs for the retry controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Minimum time between two polls of the same order.
    pub poll_interval: Duration,
    /// Transient failures tolerated before an order is dead-lettered. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_attempts: None,
        }
    }
}

/// Whether an entry may be polled at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Ready,
    NotBefore(Instant),
}

/// What to do with an entry after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryVerdict {
    Retry,
    Exhausted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The earliest instant `entry` may be polled.
    pub fn next_eligible_at(&self, entry: &OrderQueueEntry) -> Instant {
        deadline(
            entry.last_checked,
            entry.retry_after.max(self.policy.poll_interval),
        )
    }

    /// The earliest instant an entry arriving from the pending queue may be polled.
    ///
    /// The poll interval spaces consecutive polls made by one worker, so on arrival
    /// only the oracle's own window applies.
    pub fn admission_at(&self, entry: &OrderQueueEntry) -> Instant {
        deadline(entry.last_checked, entry.retry_after)
    }

    pub fn eligibility(&self, entry: &OrderQueueEntry, now: Instant) -> Eligibility {
        let due = self.next_eligible_at(entry);
        if now >= due {
            Eligibility::Ready
        } else {
            Eligibility::NotBefore(due)
        }
    }

    /// Applies a 429. Rate limiting is not counted as a failure. Windows longer than
    /// [`MAX_RETRY_AFTER`] are cut to it.
    pub fn on_rate_limited(&self, entry: &mut OrderQueueEntry, retry_after: Duration, now: Instant) {
        entry.last_checked = now;
        entry.retry_after = retry_after.min(MAX_RETRY_AFTER);
    }

    /// Applies a transient error.
    pub fn on_transient_failure(&self, entry: &mut OrderQueueEntry, now: Instant) -> RetryVerdict {
        entry.retry_count = entry.retry_count.saturating_add(1);
        entry.mark_checked(now);
        match self.policy.max_attempts {
            Some(max) if entry.retry_count >= max => RetryVerdict::Exhausted,
            _ => RetryVerdict::Retry,
        }
    }
}
