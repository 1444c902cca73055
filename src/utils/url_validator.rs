//! URL validation and normalization for shorten requests.
//!
//! Accepts scheme-less input (`example.com/page`), enforces an HTTP(S) scheme
//! and refuses URLs that point back at the shortener itself.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use url::{Host, Url};

use crate::error::AppError;

/// Scheme prefixed to input that has none.
pub const DEFAULT_SCHEME: &str = "http://";

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());

/// Validates candidate URLs against the service's own domain.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    own_host: String,
}

impl UrlValidator {
    /// Creates a validator for a service reachable at `service_domain`.
    ///
    /// `service_domain` may carry a scheme, port or trailing path
    /// (`https://s.example.com:8080/`); only the host is kept.
    pub fn new(service_domain: &str) -> Self {
        Self {
            own_host: canonical_host(&host_of(service_domain)),
        }
    }

    /// Validates `raw_url` and returns its normalized form.
    ///
    /// # Normalization
    ///
    /// 1. Surrounding whitespace is trimmed
    /// 2. `http://` is prefixed when no scheme is present
    /// 3. The URL is re-serialized by the `url` crate (lower-case host, default port removed)
    ///
    /// Applying `validate` to its own output returns the same string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is empty, unparseable, not
    /// HTTP(S), or has no usable host.
    ///
    /// Returns [`AppError::DomainConflict`] if the host is the service's own domain.
    pub fn validate(&self, raw_url: &str) -> Result<String, AppError> {
        let trimmed = raw_url.trim();
        if trimmed.is_empty() {
            return Err(AppError::bad_request(
                "Invalid URL",
                json!({ "reason": "URL is empty" }),
            ));
        }

        let candidate = enforce_scheme(trimmed);

        let url = Url::parse(&candidate).map_err(|e| {
            AppError::bad_request(
                "Invalid URL",
                json!({ "url": trimmed, "reason": e.to_string() }),
            )
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::bad_request(
                "Invalid URL",
                json!({ "url": trimmed, "reason": "Only HTTP and HTTPS are allowed" }),
            ));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) if domain.contains('.') || domain == "localhost" => {
                domain.to_string()
            }
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => format!("[{}]", ip),
            _ => {
                return Err(AppError::bad_request(
                    "Invalid URL",
                    json!({ "url": trimmed, "reason": "Missing or incomplete host" }),
                ));
            }
        };

        if canonical_host(&host) == self.own_host {
            return Err(AppError::domain_conflict(
                "Domain error",
                json!({ "url": trimmed, "reason": "URL points to this service" }),
            ));
        }

        Ok(url.to_string())
    }
}

/// Prefixes [`DEFAULT_SCHEME`] unless the input already starts with `scheme://`.
pub fn enforce_scheme(url: &str) -> String {
    if SCHEME_PREFIX.is_match(url) {
        url.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, url)
    }
}

/// Extracts the host from a loosely formatted domain string.
fn host_of(domain: &str) -> String {
    let rest = match domain.find("://") {
        Some(pos) => &domain[pos + 3..],
        None => domain,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);

    if authority.starts_with('[') {
        // IPv6 literal, optionally followed by a port
        match authority.find(']') {
            Some(end) => authority[..=end].to_string(),
            None => authority.to_string(),
        }
    } else {
        authority.split(':').next().unwrap_or(authority).to_string()
    }
}

fn canonical_host(host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}
