//! Helpers shared across layers.
//!
//! - [`alias_generator`] - Random alias generation and format checks
//! - [`url_validator`] - Destination URL validation

pub mod alias_generator;
pub mod url_validator;
