//! DTOs for mapping inspection endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{Mapping, MappingStatus};

/// Full view of a stored mapping.
#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub alias: String,
    pub short_url: String,
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: MappingStatus,
}

impl MappingResponse {
    /// Builds the response, deriving `status` from the expiry at `now`.
    pub fn from_mapping(mapping: Mapping, short_url: String, now: DateTime<Utc>) -> Self {
        let status = mapping.status_at(now);
        Self {
            alias: mapping.alias,
            short_url,
            destination_url: mapping.destination,
            created_at: mapping.created_at,
            expires_at: mapping.expires_at,
            status,
        }
    }
}

/// Page of mappings.
#[derive(Debug, Serialize)]
pub struct MappingListResponse {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub items: Vec<MappingResponse>,
}
