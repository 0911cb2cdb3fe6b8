//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::MappingService;
use crate::infrastructure::cache::CacheService;

/// Handles shared by all requests.
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub mapping_service: Arc<MappingService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(mapping_service: Arc<MappingService>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            mapping_service,
            cache,
        }
    }
}
