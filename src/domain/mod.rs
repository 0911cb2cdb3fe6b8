//! Domain layer: the mapping entity and the storage contract it lives behind.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer depends on neither the HTTP layer nor a concrete store.

pub mod entities;
pub mod repositories;
