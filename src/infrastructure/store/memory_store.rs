//! In-process key-value store for development and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::repositories::{KeyValueStore, StoreError, StoreResult};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// A [`KeyValueStore`] kept in a process-local map.
///
/// Mirrors the Redis semantics the service depends on: lazy expiry, `INCR`/`DECR`
/// on a missing key starting from `0` without expiry, and a TTL of `None` for
/// both missing and persistent keys. Time comes from `tokio::time`, so tests can
/// pause and advance the clock.
///
/// Each operation holds the lock for its whole duration, which makes it atomic
/// per key. Data is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Using in-memory store");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drops `key` if it has expired and returns the live entry, if any.
    fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
        let now = Instant::now();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }

    fn add(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut entries = self.lock();
        match Self::live(&mut entries, key) {
            Some(entry) => {
                let current: i64 = entry.value.parse().map_err(|_| StoreError::NotAnInteger {
                    key: key.to_string(),
                    value: entry.value.clone(),
                })?;
                let next = current.checked_add(delta).ok_or_else(|| {
                    StoreError::Command(format!("increment or decrement would overflow '{}'", key))
                })?;
                entry.value = next.to_string();
                Ok(next)
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: delta.to_string(),
                        expires_at: None,
                    },
                );
                Ok(delta)
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut entries = self.lock();
        Ok(Self::live(&mut entries, key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        self.add(key, 1)
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        self.add(key, -1)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut entries = self.lock();
        let now = Instant::now();
        Ok(Self::live(&mut entries, key)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    async fn ping(&self) -> bool {
        true
    }
}
