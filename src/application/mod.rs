//! Application layer services implementing business logic.
//!
//! Services validate input, apply the mapping lifecycle rules and call the
//! repository traits. HTTP handlers and the admin CLI both go through here.
//!
//! - [`services::mapping_service::MappingService`] - Shorten, update, resolve, extend expiry

pub mod services;
