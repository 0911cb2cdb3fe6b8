//! Cache service trait and error types.

use crate::domain::entities::Mapping;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache for alias lookups.
///
/// Entries hold the whole [`Mapping`], expiry included, so a hit is subject to
/// the same expiry check as a store read. Reads and writes are fail-open: a
/// broken cache degrades to store lookups and never changes an outcome.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached mapping by alias.
    ///
    /// Returns `Ok(None)` on a miss.
    async fn get_mapping(&self, alias: &str) -> CacheResult<Option<Mapping>>;

    /// Stores a mapping with an optional TTL in seconds.
    ///
    /// `None` uses the implementation default. Implementations cap the TTL at
    /// the mapping's expiry (see [`entry_ttl`]).
    async fn set_mapping(&self, mapping: &Mapping, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Removes a cached mapping after its destination or expiry changed.
    ///
    /// Unlike reads, a failed invalidation is reported, since it leaves a
    /// stale entry behind.
    async fn invalidate(&self, alias: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reporting.
    fn name(&self) -> &'static str;
}

/// Lifetime for a cache entry holding `mapping`.
///
/// The entry never outlives the mapping's expiry. Returns `None` when the
/// mapping is already expired, in which case nothing should be cached.
pub fn entry_ttl(mapping: &Mapping, default_ttl: u64, now: DateTime<Utc>) -> Option<u64> {
    let Some(expires_at) = mapping.expires_at else {
        return Some(default_ttl);
    };

    let remaining = (expires_at - now).num_seconds();
    if remaining <= 0 {
        return None;
    }

    Some(default_ttl.min(remaining as u64))
}
