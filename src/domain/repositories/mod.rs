//! Storage contracts for the domain layer.
//!
//! The service persists everything through a plain key-value interface rather
//! than per-entity repositories: URL mappings and quota counters are single
//! string keys with an expiry, so one narrow trait covers both.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] defines the operations the workflows rely on
//! - [`Keyspaces`] bundles the links and quotas keyspaces passed to services
//! - Implementations live in `crate::infrastructure::store`
//! - Mock implementations are auto-generated via `mockall` for testing

pub mod key_value_store;

pub use key_value_store::{KeyValueStore, Keyspaces, StoreError, StoreResult};

#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
