//! Rate record entity tracking one client's requests in the current window.

use std::time::Duration;
use tokio::time::Instant;

/// Stand-in for windows too long to add to an [`Instant`] (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 86_400);

/// Request-count state for one client identity within a fixed window.
///
/// `count` only grows while `now < reset_at`. Once the window has passed the
/// record is replaced by a fresh one rather than decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub count: u32,
    pub reset_at: Instant,
}

impl RateRecord {
    /// Creates an empty record whose window starts at `now`.
    pub fn fresh(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: window_end(now, window),
        }
    }

    /// Returns true once the window has elapsed.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }

    /// Whole seconds until the window resets, rounded up.
    ///
    /// Never returns zero: a record that is not yet expired always has a
    /// fraction of a second left.
    pub fn retry_after_secs(&self, now: Instant) -> u64 {
        let remaining = self.reset_at.saturating_duration_since(now);
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        secs.max(1)
    }
}

/// `now + window`, saturating instead of panicking on overflow.
pub fn window_end(now: Instant, window: Duration) -> Instant {
    now.checked_add(window).unwrap_or_else(|| now + FAR_FUTURE)
}
