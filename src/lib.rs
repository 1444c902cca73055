//! # Quota Shortener
//!
//! A URL shortening service backed by Redis, with a per-client-IP quota on
//! link creation.
//!
//! ## Architecture
//!
//! The crate is split into layers:
//!
//! - **Domain Layer** ([`domain`]) - Entities and the key-value store trait
//! - **Application Layer** ([`application`]) - Shorten, resolve and quota workflows
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory stores
//! - **API Layer** ([`api`]) - REST handlers, DTOs and middleware
//!
//! ## Storage
//!
//! Two keyspaces, each a separate Redis logical database:
//!
//! - links: `code → long URL`, expiring after the requested lifetime
//! - quotas: `client IP → remaining quota` plus the global `counter` key
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379"  # Optional, in-memory otherwise
//! export DOMAIN="localhost:3000"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{LinkService, QuotaService};
    pub use crate::domain::entities::{QuotaUsage, ShortenParams, ShortenedLink};
    pub use crate::domain::repositories::{KeyValueStore, Keyspaces};
    pub use crate::error::AppError;
    pub use crate::infrastructure::store::{MemoryStore, RedisStore};
    pub use crate::state::AppState;
}
