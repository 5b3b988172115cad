//! Rate limit information.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Rate limit information for the core API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Moment the current window resets.
    #[must_use]
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.reset).ok()?, 0)
    }

    /// Whole minutes until the window resets, measured from `now`. Zero once passed.
    #[must_use]
    pub fn minutes_until_reset(&self, now: DateTime<Utc>) -> i64 {
        self.reset_at()
            .map(|reset| (reset - now).num_minutes().max(0))
            .unwrap_or_default()
    }

    /// Time left in the current window, `None` once it has reset.
    #[must_use]
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.reset_at()? - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_at_converts_timestamp() {
        let info = RateLimitInfo {
            remaining: 10,
            reset: 1_234_567_890,
            limit: 30,
        };

        let reset = info.reset_at().unwrap();
        assert_eq!(reset.timestamp(), 1_234_567_890);
    }

    #[test]
    fn minutes_until_reset_never_negative() {
        let info = RateLimitInfo {
            remaining: 0,
            reset: 600,
            limit: 5000,
        };

        let before = DateTime::from_timestamp(0, 0).unwrap();
        let after = DateTime::from_timestamp(6000, 0).unwrap();
        assert_eq!(info.minutes_until_reset(before), 10);
        assert_eq!(info.minutes_until_reset(after), 0);
    }

    #[test]
    fn time_until_reset_is_none_once_passed() {
        let info = RateLimitInfo {
            remaining: 0,
            reset: 600,
            limit: 5000,
        };

        let before = DateTime::from_timestamp(540, 0).unwrap();
        let after = DateTime::from_timestamp(600, 0).unwrap();
        assert_eq!(info.time_until_reset(before), Some(Duration::from_secs(60)));
        assert_eq!(info.time_until_reset(after), None);
    }
}
