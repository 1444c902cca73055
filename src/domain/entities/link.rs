//! Link entities representing a short code → URL mapping.

use std::time::Duration;

use crate::domain::entities::QuotaUsage;

const SECONDS_PER_HOUR: u64 = 3600;

/// Input of the shorten workflow, already parsed from the request body.
#[derive(Debug, Clone, Default)]
pub struct ShortenParams {
    /// URL as submitted, before validation.
    pub url: String,
    /// Client-chosen short code; `None` or empty means generate one.
    pub custom_code: Option<String>,
    /// Requested lifetime; `None` means the configured default.
    pub expiry: Option<Duration>,
}

/// A mapping about to be written to the links keyspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
    pub ttl: Duration,
}

impl NewLink {
    pub fn new(code: String, long_url: String, ttl: Duration) -> Self {
        Self {
            code,
            long_url,
            ttl,
        }
    }

    /// Expiry expressed in whole hours, truncating any remainder.
    pub fn expiry_hours(&self) -> u64 {
        self.ttl.as_secs() / SECONDS_PER_HOUR
    }
}

/// Outcome of a successful shorten workflow.
#[derive(Debug, Clone)]
pub struct ShortenedLink {
    pub code: String,
    pub long_url: String,
    /// Full short URL: service domain followed by the code.
    pub short_url: String,
    pub expiry_hours: u64,
    /// Caller's quota after this creation was charged.
    pub quota: QuotaUsage,
}

/// Converts a whole number of hours into a [`Duration`].
pub fn hours(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(SECONDS_PER_HOUR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_hours_whole() {
        let link = NewLink::new("abc123".into(), "http://example.com/".into(), hours(24));
        assert_eq!(link.expiry_hours(), 24);
    }

    #[test]
    fn test_hours_saturates() {
        assert_eq!(hours(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_expiry_hours_truncates() {
        let link = NewLink::new(
            "abc123".into(),
            "http://example.com/".into(),
            Duration::from_secs(2 * 3600 + 1799),
        );
        assert_eq!(link.expiry_hours(), 2);
    }
}
