//! In-process mapping repository.
//!
//! Backs the service when `STORAGE_BACKEND=memory` and drives the HTTP tests.
//! Contents are lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Mapping store held in a `HashMap` keyed by alias.
#[derive(Default)]
pub struct MemoryMappingRepository {
    mappings: RwLock<HashMap<String, Mapping>>,
}

impl MemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a mapping as-is, bypassing validation. Useful for seeding fixtures.
    pub async fn insert(&self, mapping: Mapping) {
        self.mappings
            .write()
            .await
            .insert(mapping.alias.clone(), mapping);
    }
}

#[async_trait]
impl MappingRepository for MemoryMappingRepository {
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        let mut mappings = self.mappings.write().await;

        if mappings.contains_key(&new_mapping.alias) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "mappings_pkey" }),
            ));
        }

        let mapping = Mapping::new(
            new_mapping.alias,
            new_mapping.destination,
            new_mapping.created_at,
            None,
        );
        mappings.insert(mapping.alias.clone(), mapping.clone());

        Ok(mapping)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Mapping>, AppError> {
        Ok(self.mappings.read().await.get(alias).cloned())
    }

    async fn find_by_destination(&self, destination: &str) -> Result<Option<Mapping>, AppError> {
        Ok(self
            .mappings
            .read()
            .await
            .values()
            .filter(|m| m.destination == destination)
            .min_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.alias.cmp(&b.alias))
            })
            .cloned())
    }

    async fn update_destination(
        &self,
        alias: &str,
        destination: &str,
    ) -> Result<Option<Mapping>, AppError> {
        let mut mappings = self.mappings.write().await;

        Ok(mappings.get_mut(alias).map(|m| {
            m.destination = destination.to_string();
            m.clone()
        }))
    }

    async fn set_expiry(
        &self,
        alias: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Mapping>, AppError> {
        let mut mappings = self.mappings.write().await;

        Ok(mappings.get_mut(alias).map(|m| {
            m.expires_at = expires_at;
            m.clone()
        }))
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Mapping>, AppError> {
        let mut all: Vec<Mapping> = self.mappings.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.alias.cmp(&b.alias))
        });

        let skip = usize::try_from((page - 1).max(0) * page_size).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size.max(0)).unwrap_or(0);

        Ok(all.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.mappings.read().await.len() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
