//! Key-value store contract shared by the link and quota keyspaces.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store command error: {0}")]
    Command(String),

    #[error("Stored value for '{key}' is not an integer: {value}")]
    NotAnInteger { key: String, value: String },
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal string key-value store with per-key expiry.
///
/// Every operation is atomic for the single key it touches. Nothing is
/// transactional across keys, so callers composing several operations must
/// tolerate a partially applied sequence.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisStore`] - one Redis logical database
/// - [`crate::infrastructure::store::MemoryStore`] - in-process map for development and tests
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored at `key`, or `None` if it is absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` at `key`, replacing any previous value, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Increments the integer at `key` by one and returns the new value.
    ///
    /// A missing key is treated as `0` and created without expiry.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Decrements the integer at `key` by one and returns the new value.
    ///
    /// A missing key is treated as `0` and created without expiry.
    async fn decr(&self, key: &str) -> StoreResult<i64>;

    /// Returns the remaining time-to-live of `key`.
    ///
    /// `None` when the key does not exist or carries no expiry.
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> bool;
}

/// The two logically separate keyspaces the service works with.
///
/// They may live in one physical store or in two; the services never assume
/// either.
#[derive(Clone)]
pub struct Keyspaces {
    /// Short code → original URL.
    pub links: Arc<dyn KeyValueStore>,
    /// Client IP → remaining quota, plus the global usage counter.
    pub quotas: Arc<dyn KeyValueStore>,
}

impl Keyspaces {
    pub fn new(links: Arc<dyn KeyValueStore>, quotas: Arc<dyn KeyValueStore>) -> Self {
        Self { links, quotas }
    }
}
