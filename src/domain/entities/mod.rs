//! Core domain entities.
//!
//! - [`Mapping`] - A short alias bound to a destination URL
//! - [`NewMapping`] - Input for persisting a new mapping
//! - [`MappingStatus`] - Active/expired status derived at read time

pub mod mapping;

pub use mapping::{Mapping, MappingStatus, NewMapping};
