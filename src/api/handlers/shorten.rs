//! Handler for the shorten endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the alias for a destination URL, creating one if needed.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "destination_url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// ```json
/// { "alias": "Xk3_a9Qz", "short_url": "https://s.example.com/Xk3_a9Qz" }
/// ```
///
/// Shortening the same destination again returns the same alias.
///
/// # Errors
///
/// Returns 400 Bad Request if the destination is not an absolute http(s) URL.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let mapping = state
        .mapping_service
        .shorten(&payload.destination_url)
        .await?;

    let short_url = state.mapping_service.short_url(&mapping.alias);

    Ok(Json(ShortenResponse {
        alias: mapping.alias,
        short_url,
    }))
}
