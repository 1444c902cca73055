//! Business logic services for the application layer.

pub mod link_service;
pub mod quota_service;

pub use link_service::{LinkService, USAGE_COUNTER_KEY};
pub use quota_service::QuotaService;
