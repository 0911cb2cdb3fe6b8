//! DTOs for the shorten endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a destination URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Absolute http(s) URL to alias. Checked in full by the service.
    #[validate(length(min = 1, max = 2048))]
    pub destination_url: String,
}

/// Alias issued for (or already bound to) the destination.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub alias: String,
    pub short_url: String,
}
