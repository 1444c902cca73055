//! HTTP middleware for request processing.
//!
//! Quotas are enforced inside the shorten workflow rather than as a layer,
//! because only successful requests are charged.

pub mod tracing;
