//! Per-client request quota backed by the quotas keyspace.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{QuotaDecision, QuotaUsage};
use crate::domain::repositories::{KeyValueStore, StoreError};
use crate::error::AppError;

/// Fixed-window request quota keyed by client IP.
///
/// Each client gets `limit` shorten requests per window. The window starts on
/// the client's first request and is not extended by later ones; when the
/// counter key expires the next request starts a fresh window.
///
/// Checking and charging are separate steps so that only successful requests
/// consume quota. Two concurrent requests from one client can both pass the
/// check while a single unit remains; the counter then goes negative and the
/// client stays blocked until the window ends.
pub struct QuotaService {
    store: Arc<dyn KeyValueStore>,
    limit: i64,
    window: Duration,
}

impl QuotaService {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: i64, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decides whether `client_id` may shorten another URL.
    ///
    /// Starts a new window when the client has no counter. An existing counter
    /// is only read, never charged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures or if the stored counter
    /// is not an integer.
    pub async fn check_and_maybe_initialize(
        &self,
        client_id: &str,
    ) -> Result<QuotaDecision, AppError> {
        let Some(raw) = self.store.get(client_id).await? else {
            self.reset(client_id).await?;
            debug!("Quota window started for {}", client_id);
            return Ok(QuotaDecision::Allowed);
        };

        let remaining = parse_counter(client_id, &raw)?;
        if remaining > 0 {
            return Ok(QuotaDecision::Allowed);
        }

        match self.store.ttl(client_id).await? {
            Some(reset_after) => {
                info!(
                    "Quota exhausted for {}, resets in {}s",
                    client_id,
                    reset_after.as_secs()
                );
                Ok(QuotaDecision::Blocked { reset_after })
            }
            None => {
                // Expired since the read, or lost its expiry: the window is over either way
                warn!("Quota counter for {} had no expiry, restarting window", client_id);
                self.reset(client_id).await?;
                Ok(QuotaDecision::Allowed)
            }
        }
    }

    /// Charges one request to `client_id` and reports what is left.
    ///
    /// Must only be called once the request has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn consume(&self, client_id: &str) -> Result<QuotaUsage, AppError> {
        let remaining = self.store.decr(client_id).await?;

        match self.store.ttl(client_id).await? {
            Some(reset_after) => Ok(QuotaUsage {
                remaining,
                reset_after,
            }),
            None => {
                // The window ended between check and charge and DECR recreated the
                // key without expiry; charge this request to a fresh window instead.
                let remaining = self.limit - 1;
                self.store
                    .set(client_id, &remaining.to_string(), self.window)
                    .await?;
                Ok(QuotaUsage {
                    remaining,
                    reset_after: self.window,
                })
            }
        }
    }

    /// Returns the client's current quota without changing it.
    ///
    /// A client without a counter is reported with the full limit and window.
    pub async fn peek(&self, client_id: &str) -> Result<QuotaUsage, AppError> {
        let Some(raw) = self.store.get(client_id).await? else {
            return Ok(QuotaUsage {
                remaining: self.limit,
                reset_after: self.window,
            });
        };

        let remaining = parse_counter(client_id, &raw)?;
        let reset_after = self.store.ttl(client_id).await?.unwrap_or(Duration::ZERO);

        Ok(QuotaUsage {
            remaining,
            reset_after,
        })
    }

    /// Restores the full quota for `client_id` with a fresh window.
    pub async fn reset(&self, client_id: &str) -> Result<(), AppError> {
        self.store
            .set(client_id, &self.limit.to_string(), self.window)
            .await?;
        Ok(())
    }
}

fn parse_counter(client_id: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| {
        let e = StoreError::NotAnInteger {
            key: client_id.to_string(),
            value: raw.to_string(),
        };
        tracing::error!("{}", e);
        AppError::internal("Could not read rate limit", json!({}))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::minutes_ceil;
    use crate::domain::repositories::MockKeyValueStore;
    use crate::infrastructure::store::MemoryStore;

    const IP: &str = "203.0.113.7";
    const WINDOW: Duration = Duration::from_secs(30 * 60);

    fn memory_service(limit: i64) -> (QuotaService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (QuotaService::new(store.clone(), limit, WINDOW), store)
    }

    #[tokio::test]
    async fn test_first_request_initializes_counter() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .withf(|key| key == IP)
            .times(1)
            .returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|key, value, ttl| key == IP && value == "10" && *ttl == WINDOW)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let decision = service.check_and_maybe_initialize(IP).await.unwrap();

        assert_eq!(decision, QuotaDecision::Allowed);
    }

    #[tokio::test]
    async fn test_positive_counter_is_not_mutated() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("3".to_string())));
        store.expect_set().times(0);
        store.expect_decr().times(0);
        store.expect_ttl().times(0);

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let decision = service.check_and_maybe_initialize(IP).await.unwrap();

        assert_eq!(decision, QuotaDecision::Allowed);
    }

    #[tokio::test]
    async fn test_exhausted_counter_blocks_with_ttl() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("0".to_string())));
        store
            .expect_ttl()
            .times(1)
            .returning(|_| Ok(Some(Duration::from_secs(600))));
        store.expect_set().times(0);

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let decision = service.check_and_maybe_initialize(IP).await.unwrap();

        assert_eq!(
            decision,
            QuotaDecision::Blocked {
                reset_after: Duration::from_secs(600)
            }
        );
    }

    #[tokio::test]
    async fn test_negative_counter_blocks() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some("-2".to_string())));
        store
            .expect_ttl()
            .returning(|_| Ok(Some(Duration::from_secs(5))));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let decision = service.check_and_maybe_initialize(IP).await.unwrap();

        assert!(decision.is_blocked());
    }

    #[tokio::test]
    async fn test_exhausted_counter_without_ttl_restarts_window() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some("0".to_string())));
        store.expect_ttl().returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|_, value, ttl| value == "10" && *ttl == WINDOW)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let decision = service.check_and_maybe_initialize(IP).await.unwrap();

        assert_eq!(decision, QuotaDecision::Allowed);
    }

    #[tokio::test]
    async fn test_store_error_is_not_treated_as_allowed() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Connection("refused".to_string())));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let result = service.check_and_maybe_initialize(IP).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_unparseable_counter_is_internal_error() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some("lots".to_string())));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let result = service.check_and_maybe_initialize(IP).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_consume_reports_remaining_and_ttl() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_decr()
            .withf(|key| key == IP)
            .times(1)
            .returning(|_| Ok(9));
        store
            .expect_ttl()
            .times(1)
            .returning(|_| Ok(Some(Duration::from_secs(1700))));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let usage = service.consume(IP).await.unwrap();

        assert_eq!(usage.remaining, 9);
        assert_eq!(usage.reset_after, Duration::from_secs(1700));
    }

    #[tokio::test]
    async fn test_consume_after_window_rollover_starts_fresh_window() {
        let mut store = MockKeyValueStore::new();
        store.expect_decr().returning(|_| Ok(-1));
        store.expect_ttl().returning(|_| Ok(None));
        store
            .expect_set()
            .withf(|_, value, ttl| value == "9" && *ttl == WINDOW)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);
        let usage = service.consume(IP).await.unwrap();

        assert_eq!(usage.remaining, 9);
        assert_eq!(usage.reset_after, WINDOW);
    }

    #[tokio::test]
    async fn test_consume_store_error() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_decr()
            .returning(|_| Err(StoreError::Command("READONLY".to_string())));

        let service = QuotaService::new(Arc::new(store), 10, WINDOW);

        assert!(matches!(
            service.consume(IP).await,
            Err(AppError::Internal { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exhausts_then_resets_after_window() {
        let (service, _store) = memory_service(2);

        for expected in [1, 0] {
            assert_eq!(
                service.check_and_maybe_initialize(IP).await.unwrap(),
                QuotaDecision::Allowed
            );
            assert_eq!(service.consume(IP).await.unwrap().remaining, expected);
        }

        match service.check_and_maybe_initialize(IP).await.unwrap() {
            QuotaDecision::Blocked { reset_after } => {
                assert!(reset_after > Duration::ZERO);
                assert!(reset_after <= WINDOW);
            }
            QuotaDecision::Allowed => panic!("expected client to be blocked"),
        }

        tokio::time::advance(WINDOW).await;

        assert_eq!(
            service.check_and_maybe_initialize(IP).await.unwrap(),
            QuotaDecision::Allowed
        );
        assert_eq!(service.peek(IP).await.unwrap().remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_just_before_window_end_reports_positive_wait() {
        let (service, _store) = memory_service(1);

        service.check_and_maybe_initialize(IP).await.unwrap();
        service.consume(IP).await.unwrap();

        tokio::time::advance(WINDOW - Duration::from_millis(400)).await;

        match service.check_and_maybe_initialize(IP).await.unwrap() {
            QuotaDecision::Blocked { reset_after } => {
                assert_eq!(reset_after, Duration::from_millis(400));
                assert_eq!(minutes_ceil(reset_after), 1);
            }
            QuotaDecision::Allowed => panic!("expected client to be blocked"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_is_not_renewed_by_later_requests() {
        let (service, store) = memory_service(5);

        service.check_and_maybe_initialize(IP).await.unwrap();
        service.consume(IP).await.unwrap();

        tokio::time::advance(Duration::from_secs(600)).await;
        service.check_and_maybe_initialize(IP).await.unwrap();
        let usage = service.consume(IP).await.unwrap();

        assert_eq!(usage.remaining, 3);
        assert_eq!(usage.reset_after, WINDOW - Duration::from_secs(600));
        assert_eq!(
            store.ttl(IP).await.unwrap(),
            Some(WINDOW - Duration::from_secs(600))
        );
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let (service, _store) = memory_service(1);

        service.check_and_maybe_initialize("10.0.0.1").await.unwrap();
        service.consume("10.0.0.1").await.unwrap();

        assert!(
            service
                .check_and_maybe_initialize("10.0.0.1")
                .await
                .unwrap()
                .is_blocked()
        );
        assert!(
            !service
                .check_and_maybe_initialize("10.0.0.2")
                .await
                .unwrap()
                .is_blocked()
        );
    }

    #[tokio::test]
    async fn test_peek_unknown_client_reports_full_quota() {
        let (service, _store) = memory_service(7);
        let usage = service.peek(IP).await.unwrap();

        assert_eq!(usage.remaining, 7);
        assert_eq!(usage.reset_after, WINDOW);
    }

    #[tokio::test]
    async fn test_reset_restores_full_quota() {
        let (service, _store) = memory_service(1);

        service.check_and_maybe_initialize(IP).await.unwrap();
        service.consume(IP).await.unwrap();
        service.reset(IP).await.unwrap();

        assert!(!service.check_and_maybe_initialize(IP).await.unwrap().is_blocked());
    }
}
