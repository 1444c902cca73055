//! DTOs for the link shortening endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{ShortenParams, ShortenedLink, hours};

/// Custom codes must form a single URL path segment. Empty means "generate one".
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]*$").unwrap());

/// Upper bound for a requested expiry (one year).
const MAX_EXPIRY_HOURS: u64 = 24 * 365;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// URL to shorten; the scheme may be omitted.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom short code.
    #[serde(default)]
    #[validate(
        length(max = 64, message = "Custom short code must be at most 64 characters"),
        regex(
            path = *CUSTOM_CODE_REGEX,
            message = "Custom short code may only contain letters, digits, '-' and '_'"
        )
    )]
    pub short: Option<String>,

    /// Optional lifetime in hours; absent or `0` uses the service default.
    #[serde(default)]
    #[validate(range(max = MAX_EXPIRY_HOURS, message = "Expiry must be at most one year"))]
    pub expiry: Option<u64>,
}

impl From<ShortenRequest> for ShortenParams {
    fn from(req: ShortenRequest) -> Self {
        Self {
            url: req.url,
            custom_code: req.short,
            expiry: req.expiry.map(hours),
        }
    }
}

/// Successful shorten response.
///
/// ```json
/// {
///   "url": "http://example.com/page",
///   "short": "s.example.com/3f9a1c",
///   "expiry": 24,
///   "rate_limit": 9,
///   "rate_limit_reset": 30
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    /// Normalized original URL.
    pub url: String,
    /// Full short URL.
    pub short: String,
    /// Expiry in whole hours.
    pub expiry: u64,
    /// Shorten requests left in the current window.
    pub rate_limit: i64,
    /// Minutes until the quota window resets.
    pub rate_limit_reset: u64,
}

impl From<ShortenedLink> for ShortenResponse {
    fn from(link: ShortenedLink) -> Self {
        Self {
            rate_limit: link.quota.remaining,
            rate_limit_reset: link.quota.reset_minutes(),
            url: link.long_url,
            short: link.short_url,
            expiry: link.expiry_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> ShortenRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_minimal_request_is_valid() {
        let req = request(json!({ "url": "example.com" }));
        assert!(req.validate().is_ok());
        assert!(req.short.is_none());
        assert!(req.expiry.is_none());
    }

    #[test]
    fn test_empty_custom_code_is_valid() {
        let req = request(json!({ "url": "example.com", "short": "" }));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_custom_code_with_slash_is_invalid() {
        let req = request(json!({ "url": "example.com", "short": "a/b" }));
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("short"));
    }

    #[test]
    fn test_custom_code_too_long() {
        let req = request(json!({ "url": "example.com", "short": "a".repeat(65) }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_url_is_invalid() {
        let req = request(json!({ "url": "" }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_expiry_upper_bound() {
        assert!(
            request(json!({ "url": "example.com", "expiry": MAX_EXPIRY_HOURS }))
                .validate()
                .is_ok()
        );
        assert!(
            request(json!({ "url": "example.com", "expiry": MAX_EXPIRY_HOURS + 1 }))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_into_params_converts_hours() {
        let params: ShortenParams =
            request(json!({ "url": "example.com", "short": "abc", "expiry": 2 })).into();

        assert_eq!(params.url, "example.com");
        assert_eq!(params.custom_code.as_deref(), Some("abc"));
        assert_eq!(params.expiry, Some(hours(2)));
    }
}
