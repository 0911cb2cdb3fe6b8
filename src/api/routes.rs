//! API route configuration.

use crate::api::handlers::{
    mapping_handler, mapping_list_handler, shorten_handler, update_expiry_handler, update_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`          - Get or create the alias for a destination
/// - `POST /update`           - Point an alias at a new destination
/// - `POST /update-expiry`    - Restart an alias's expiry window
/// - `GET  /mappings`         - List mappings (paginated)
/// - `GET  /mappings/{alias}` - Inspect a single mapping
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/update", post(update_handler))
        .route("/update-expiry", post(update_expiry_handler))
        .route("/mappings", get(mapping_list_handler))
        .route("/mappings/{alias}", get(mapping_handler))
}
