//! DTO for the update-expiry endpoint.

use serde::Deserialize;

/// Request to restart an alias's expiry window.
///
/// `days_to_add` counts from now, not from the current expiry. Negative values
/// are allowed and expire the mapping immediately.
#[derive(Debug, Deserialize)]
pub struct UpdateExpiryRequest {
    pub alias: String,
    pub days_to_add: i64,
}
