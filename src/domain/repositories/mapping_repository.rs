//! Repository trait for mapping storage.

use crate::domain::entities::{Mapping, NewMapping};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage contract for the mapping collection.
///
/// Every method is a single read or a single write against the store. There are
/// no multi-statement transactions; callers accept that two concurrent shorten
/// requests for the same destination may both insert.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryMappingRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Persists a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the alias is already taken.
    /// Returns [`AppError::Internal`] on store errors.
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError>;

    /// Finds a mapping by alias.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<Mapping>, AppError>;

    /// Finds a mapping whose destination equals `destination` byte for byte.
    ///
    /// When duplicates exist the oldest mapping wins.
    async fn find_by_destination(&self, destination: &str) -> Result<Option<Mapping>, AppError>;

    /// Overwrites the destination of an existing mapping.
    ///
    /// Returns `Ok(None)` if no mapping has this alias.
    async fn update_destination(
        &self,
        alias: &str,
        destination: &str,
    ) -> Result<Option<Mapping>, AppError>;

    /// Replaces the expiry of an existing mapping.
    ///
    /// Returns `Ok(None)` if no mapping has this alias.
    async fn set_expiry(
        &self,
        alias: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Mapping>, AppError>;

    /// Lists mappings, newest first.
    ///
    /// # Arguments
    ///
    /// - `page` - Page number (1-indexed)
    /// - `page_size` - Number of items per page
    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Mapping>, AppError>;

    /// Counts stored mappings.
    async fn count(&self) -> Result<i64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
