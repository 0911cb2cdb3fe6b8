//! Handlers for inspecting stored mappings.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;

use crate::api::dto::mapping::{MappingListResponse, MappingResponse};
use crate::api::dto::pagination::PaginationParams;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a single mapping, expired or not.
///
/// # Endpoint
///
/// `GET /api/mappings/{alias}`
///
/// # Errors
///
/// Returns 404 Not Found if the alias does not exist.
pub async fn mapping_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MappingResponse>, AppError> {
    let mapping = state.mapping_service.get_mapping(&alias).await?;
    let short_url = state.mapping_service.short_url(&mapping.alias);

    Ok(Json(MappingResponse::from_mapping(
        mapping,
        short_url,
        Utc::now(),
    )))
}

/// Lists mappings, newest first.
///
/// # Endpoint
///
/// `GET /api/mappings?page=1&page_size=25`
///
/// # Errors
///
/// Returns 400 Bad Request for out-of-range pagination.
pub async fn mapping_list_handler(
    Query(params): Query<PaginationParams>,
    State(state): State<AppState>,
) -> Result<Json<MappingListResponse>, AppError> {
    let (page, page_size) = params.resolve()?;

    let (mappings, total) = state
        .mapping_service
        .list_mappings(i64::from(page), i64::from(page_size))
        .await?;

    let now = Utc::now();
    let items = mappings
        .into_iter()
        .map(|m| {
            let short_url = state.mapping_service.short_url(&m.alias);
            MappingResponse::from_mapping(m, short_url, now)
        })
        .collect();

    Ok(Json(MappingListResponse {
        page,
        page_size,
        total,
        items,
    }))
}
