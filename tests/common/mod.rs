#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use url_alias::application::services::MappingService;
use url_alias::domain::entities::Mapping;
use url_alias::infrastructure::cache::NullCache;
use url_alias::infrastructure::persistence::MemoryMappingRepository;
use url_alias::state::AppState;

pub const BASE_URL: &str = "https://s.example.com";

pub fn create_test_state() -> (AppState, Arc<MemoryMappingRepository>) {
    let repo = Arc::new(MemoryMappingRepository::new());
    let cache = Arc::new(NullCache::new());

    let mapping_service = Arc::new(MappingService::new(repo.clone(), cache.clone(), BASE_URL));

    (AppState::new(mapping_service, cache), repo)
}

pub async fn create_test_mapping(
    repo: &MemoryMappingRepository,
    alias: &str,
    destination: &str,
    expires_at: Option<DateTime<Utc>>,
) {
    repo.insert(Mapping::new(
        alias.to_string(),
        destination.to_string(),
        Utc::now() - Duration::hours(1),
        expires_at,
    ))
    .await;
}

pub async fn create_expired_mapping(repo: &MemoryMappingRepository, alias: &str, destination: &str) {
    create_test_mapping(repo, alias, destination, Some(Utc::now() - Duration::seconds(1))).await;
}
