//! Redis-backed key-value store.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

use crate::domain::repositories::{KeyValueStore, StoreError, StoreResult};

/// One Redis logical database exposed as a [`KeyValueStore`].
///
/// Uses a `ConnectionManager`, which multiplexes commands over a single
/// connection and reconnects on failure. Unlike a cache, errors are
/// propagated: a quota lookup that fails must not be read as "not blocked".
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    name: &'static str,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - connection string including the database index,
    ///   e.g. `redis://localhost:6379/1`
    /// - `name` - keyspace label used in logs
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, name: &'static str) -> StoreResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            StoreError::Connection(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis ({} keyspace)", name);

        Ok(Self {
            conn: manager,
            name,
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value = conn.get::<_, Option<String>>(key).await?;
        debug!(keyspace = self.name, key, hit = value.is_some(), "GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        debug!(keyspace = self.name, key, ttl_seconds = seconds, "SETEX");
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value = conn.incr::<_, _, i64>(key, 1).await?;
        debug!(keyspace = self.name, key, value, "INCR");
        Ok(value)
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value = conn.decr::<_, _, i64>(key, 1).await?;
        debug!(keyspace = self.name, key, value, "DECR");
        Ok(value)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut conn = self.conn.clone();
        // -2: no such key, -1: key without expiry
        let millis = conn.pttl::<_, i64>(key).await?;
        Ok(u64::try_from(millis).ok().map(Duration::from_millis))
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
