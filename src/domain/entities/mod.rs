//! Core domain entities.
//!
//! Entities are plain data structures passed between the services and the
//! HTTP layer. Nothing here touches the store.
//!
//! - [`ShortenParams`] - Parsed shorten request
//! - [`NewLink`] / [`ShortenedLink`] - A mapping before and after it is persisted
//! - [`QuotaDecision`] / [`QuotaUsage`] - Rate limiter outcomes

pub mod link;
pub mod quota;

pub use link::{NewLink, ShortenParams, ShortenedLink, hours};
pub use quota::{QuotaDecision, QuotaUsage, minutes_ceil, seconds_ceil};
