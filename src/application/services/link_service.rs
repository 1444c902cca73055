//! Shorten and resolve workflows.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};

use crate::application::services::QuotaService;
use crate::domain::entities::{NewLink, QuotaDecision, ShortenParams, ShortenedLink};
use crate::domain::repositories::Keyspaces;
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_validator::UrlValidator;

/// Key of the global usage counter in the quotas keyspace.
pub const USAGE_COUNTER_KEY: &str = "counter";

/// Service for creating and resolving short links.
///
/// Holds no per-request state; all state lives in the [`Keyspaces`]. Both
/// workflows are plain sequences of single-key store operations and are not
/// atomic as a whole. The partial states they can leave behind are documented
/// on [`Self::shorten`] and [`Self::resolve`].
pub struct LinkService {
    keyspaces: Keyspaces,
    quota: Arc<QuotaService>,
    validator: UrlValidator,
    domain: String,
    default_expiry: Duration,
}

impl LinkService {
    /// Creates a link service.
    ///
    /// # Arguments
    ///
    /// - `keyspaces` - links and quotas stores
    /// - `quota` - rate limiter charged for every successful shorten
    /// - `domain` - public domain prefixed to codes in short URLs
    /// - `default_expiry` - mapping lifetime when the request does not set one
    pub fn new(
        keyspaces: Keyspaces,
        quota: Arc<QuotaService>,
        domain: impl Into<String>,
        default_expiry: Duration,
    ) -> Self {
        let domain = domain.into();
        Self {
            keyspaces,
            quota,
            validator: UrlValidator::new(&domain),
            domain,
            default_expiry,
        }
    }

    /// Shortens a URL on behalf of `client_id`.
    ///
    /// # Steps
    ///
    /// 1. Check the client's quota (blocked → nothing else happens)
    /// 2. Validate and normalize the URL
    /// 3. Pick the code (custom or generated)
    /// 4. Store `code → url` with the requested or default expiry
    /// 5. Charge the client's quota
    ///
    /// Quota is only charged in step 5, so rejected requests cost nothing.
    ///
    /// An existing mapping with the same code is overwritten: codes are not
    /// checked for collisions.
    ///
    /// If step 5 fails the mapping from step 4 stays in place and the request
    /// still reports [`AppError::Internal`]. Whether the client was charged
    /// depends on where step 5 failed: a failed decrement charges nothing, while
    /// a failed expiry read after the decrement leaves the charge in place.
    ///
    /// # Errors
    ///
    /// - [`AppError::RateLimited`] if the client's quota is exhausted
    /// - [`AppError::Validation`] if the URL is malformed
    /// - [`AppError::DomainConflict`] if the URL points at this service
    /// - [`AppError::Internal`] on store failures
    pub async fn shorten(
        &self,
        client_id: &str,
        params: ShortenParams,
    ) -> Result<ShortenedLink, AppError> {
        if let QuotaDecision::Blocked { reset_after } =
            self.quota.check_and_maybe_initialize(client_id).await?
        {
            return Err(AppError::rate_limited(reset_after));
        }

        let long_url = self.validator.validate(&params.url)?;

        let code = generate_code(params.custom_code.as_deref());

        let ttl = params
            .expiry
            .filter(|d| !d.is_zero())
            .unwrap_or(self.default_expiry);
        let new_link = NewLink::new(code, long_url, ttl);

        self.keyspaces
            .links
            .set(&new_link.code, &new_link.long_url, new_link.ttl)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store link {}: {}", new_link.code, e);
                AppError::internal("Unable to connect to server", json!({}))
            })?;

        info!(
            "Shortened {} -> {} for {} (expires in {}h)",
            new_link.code,
            new_link.long_url,
            client_id,
            new_link.expiry_hours()
        );

        let quota = self.quota.consume(client_id).await?;

        Ok(ShortenedLink {
            short_url: self.short_url(&new_link.code),
            expiry_hours: new_link.expiry_hours(),
            code: new_link.code,
            long_url: new_link.long_url,
            quota,
        })
    }

    /// Returns the URL stored under `code` and counts the resolution.
    ///
    /// The usage counter is incremented only after a successful lookup. If the
    /// increment fails no URL is returned, so callers never redirect a
    /// resolution that went uncounted.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown or expired
    /// - [`AppError::Internal`] if the lookup or the counter update fails
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let long_url = self
            .keyspaces
            .links
            .get(code)
            .await?
            .ok_or_else(|| {
                debug!("Short code {} not found", code);
                AppError::not_found(
                    "Short URL not found in the database",
                    json!({ "code": code }),
                )
            })?;

        self.keyspaces
            .quotas
            .incr(USAGE_COUNTER_KEY)
            .await
            .map_err(|e| {
                tracing::error!("Failed to increment usage counter: {}", e);
                AppError::internal("Failed to increment counter", json!({}))
            })?;

        Ok(long_url)
    }

    /// Returns the global number of successful resolutions.
    pub async fn usage_count(&self) -> Result<i64, AppError> {
        let Some(raw) = self.keyspaces.quotas.get(USAGE_COUNTER_KEY).await? else {
            return Ok(0);
        };

        raw.parse().map_err(|_| {
            AppError::internal("Could not read usage counter", json!({ "value": raw }))
        })
    }

    /// Constructs the full short URL from the service domain and a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.domain.trim_end_matches('/'), code)
    }
}
