//! DTO for the update endpoint.

use serde::Deserialize;
use validator::Validate;

/// Request to point an alias at a new destination.
///
/// `alias` is not checked here: any alias the store does not hold is a 404.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRequest {
    pub alias: String,

    #[validate(length(min = 1, max = 2048))]
    pub destination_url: String,
}
