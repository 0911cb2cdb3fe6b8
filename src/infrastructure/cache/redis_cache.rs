//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, entry_ttl};
use crate::domain::entities::Mapping;
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Redis cache for alias lookups.
///
/// Mappings are stored as JSON under `mapping:{alias}`. Reads and writes are
/// fail-open: errors are logged but don't propagate to callers. A failed
/// invalidation is returned as an error.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "mapping:".to_string(),
        })
    }

    fn build_key(&self, alias: &str) -> String {
        format!("{}{}", self.key_prefix, alias)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_mapping(&self, alias: &str) -> CacheResult<Option<Mapping>> {
        let key = self.build_key(alias);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Mapping>(&raw) {
                Ok(mapping) => {
                    debug!(alias, "Cache HIT");
                    Ok(Some(mapping))
                }
                Err(e) => {
                    warn!(alias, error = %e, "Discarding undecodable cache entry");
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!(alias, "Cache MISS");
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", alias, e);
                Ok(None)
            }
        }
    }

    async fn set_mapping(&self, mapping: &Mapping, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let Some(ttl) = entry_ttl(
            mapping,
            ttl_seconds.unwrap_or(self.default_ttl),
            Utc::now(),
        ) else {
            debug!(alias = %mapping.alias, "Skipping cache SET for expired mapping");
            return Ok(());
        };

        let key = self.build_key(&mapping.alias);
        let payload = serde_json::to_string(mapping)
            .map_err(|e| CacheError::OperationError(format!("Failed to encode mapping: {}", e)))?;

        let mut conn = self.client.clone();
        match conn.set_ex::<_, _, ()>(&key, payload, ttl).await {
            Ok(()) => {
                debug!(alias = %mapping.alias, ttl, "Cache SET");
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", mapping.alias, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, alias: &str) -> CacheResult<()> {
        let key = self.build_key(alias);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!(alias, "Cache INVALIDATE");
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", alias, e);
                Err(CacheError::OperationError(format!(
                    "Failed to invalidate {}: {}",
                    alias, e
                )))
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
