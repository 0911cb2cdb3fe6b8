//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies are explicit structs deserialized with Serde and checked
//! with `validator` before they reach the service layer.

pub mod expiry;
pub mod health;
pub mod mapping;
pub mod pagination;
pub mod shorten;
pub mod update;

use serde::Serialize;

/// Body returned by operations that only report success.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
