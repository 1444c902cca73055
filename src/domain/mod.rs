//! Domain layer containing business entities and storage contracts.
//!
//! Independent of infrastructure: the store trait is defined here and
//! implemented in [`crate::infrastructure::store`].
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - The key-value store contract and keyspaces

pub mod entities;
pub mod repositories;
