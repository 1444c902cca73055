//! Application layer services implementing business logic.
//!
//! Services orchestrate the store operations behind each endpoint and provide a
//! clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::quota_service::QuotaService`] - Per-client request quota
//! - [`services::link_service::LinkService`] - Shorten and resolve workflows

pub mod services;
