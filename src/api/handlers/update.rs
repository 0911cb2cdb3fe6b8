//! Handlers that change an existing mapping.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::SuccessResponse;
use crate::api::dto::expiry::UpdateExpiryRequest;
use crate::api::dto::update::UpdateRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Points an alias at a new destination.
///
/// # Endpoint
///
/// `POST /api/update`
///
/// # Request Body
///
/// ```json
/// { "alias": "Xk3_a9Qz", "destination_url": "https://example.com/b" }
/// ```
///
/// Creation time and expiry are kept.
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid URL.
/// Returns 404 Not Found if the alias does not exist.
pub async fn update_handler(
    State(state): State<AppState>,
    Json(payload): Json<UpdateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    payload.validate()?;

    state
        .mapping_service
        .update(&payload.alias, &payload.destination_url)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Restarts an alias's expiry window from now.
///
/// # Endpoint
///
/// `POST /api/update-expiry`
///
/// # Request Body
///
/// ```json
/// { "alias": "Xk3_a9Qz", "days_to_add": 30 }
/// ```
///
/// The new expiry is `now + days_to_add` days; whatever remained of the
/// previous expiry is dropped.
///
/// # Errors
///
/// Returns 400 Bad Request if the resulting expiry is out of range.
/// Returns 404 Not Found if the alias does not exist.
pub async fn update_expiry_handler(
    State(state): State<AppState>,
    Json(payload): Json<UpdateExpiryRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .mapping_service
        .extend_expiry(&payload.alias, payload.days_to_add)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}
