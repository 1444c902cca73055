//! Key-value store backends.
//!
//! Provides two implementations of
//! [`KeyValueStore`](crate::domain::repositories::KeyValueStore):
//! - [`RedisStore`] - Production backend, one Redis logical database per keyspace
//! - [`MemoryStore`] - Process-local backend used when Redis is not configured and in tests

mod memory_store;
mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
