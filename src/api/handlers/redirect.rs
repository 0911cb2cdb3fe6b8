//! Handler for alias redirects.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects an alias to its destination.
///
/// # Endpoint
///
/// `GET /{alias}`
///
/// # Errors
///
/// Returns 404 Not Found if the alias doesn't exist.
/// Returns 410 Gone if the mapping has expired.
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let destination = state.mapping_service.resolve(&alias).await?;
    debug!(%alias, %destination, "Redirecting");

    Ok(Redirect::temporary(&destination))
}
