//! Helpers used by the services and handlers.
//!
//! - [`code_generator`] - Short code generation
//! - [`url_validator`] - URL validation, scheme enforcement and loop detection
//! - [`client_ip`] - Client IP extraction for quotas

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;
