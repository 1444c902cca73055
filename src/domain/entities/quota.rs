//! Quota entities produced by the rate limiter.

use std::time::Duration;

/// Result of checking a client's quota before a shorten request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// The client may proceed; the counter has not been charged yet.
    Allowed,
    /// The client exhausted its quota; the window resets after `reset_after`.
    Blocked { reset_after: Duration },
}

impl QuotaDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, QuotaDecision::Blocked { .. })
    }
}

/// Client quota as reported after a successful request was charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    pub remaining: i64,
    pub reset_after: Duration,
}

impl QuotaUsage {
    /// Reset wait in whole minutes, rounded up so a pending reset is never `0`.
    pub fn reset_minutes(&self) -> u64 {
        minutes_ceil(self.reset_after)
    }
}

/// Rounds a duration up to whole minutes, so any non-zero wait is at least `1`.
pub fn minutes_ceil(d: Duration) -> u64 {
    const NANOS_PER_MINUTE: u128 = 60_000_000_000;
    u64::try_from(d.as_nanos().div_ceil(NANOS_PER_MINUTE)).unwrap_or(u64::MAX)
}

/// Rounds a duration up to whole seconds.
pub fn seconds_ceil(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
