//! Mapping lifecycle: shorten, update, resolve and extend expiry.

use std::sync::Arc;

use chrono::{Datelike, TimeDelta, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::alias_generator::{generate_alias, is_well_formed};
use crate::utils::url_validator::validate_destination;

/// Attempts at finding a free alias before giving up.
const MAX_ALIAS_ATTEMPTS: usize = 10;

/// Earliest year an expiry may fall in. PostgreSQL timestamps stop at 4713 BC.
const MIN_EXPIRY_YEAR: i32 = 1;

/// Service owning every operation on the mapping collection.
///
/// Each public method maps to one request: no operation calls another, and
/// none holds state between calls. The store handle and cache are injected.
pub struct MappingService {
    repository: Arc<dyn MappingRepository>,
    cache: Arc<dyn CacheService>,
    base_url: String,
}

impl MappingService {
    /// Creates a new mapping service.
    ///
    /// `base_url` prefixes aliases when building short URLs, e.g.
    /// `https://s.example.com` produces `https://s.example.com/abc123`.
    pub fn new(
        repository: Arc<dyn MappingRepository>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the alias for `destination`, creating a mapping if none exists.
    ///
    /// # Deduplication
    ///
    /// Matching is by exact string. An existing mapping is returned untouched,
    /// including its expiry, even if that expiry has passed. Two concurrent calls
    /// for a new destination may both insert; that duplicate is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `destination` is not an absolute web URL.
    /// Returns [`AppError::Internal`] on store errors or if no free alias is found.
    pub async fn shorten(&self, destination: &str) -> Result<Mapping, AppError> {
        validate(destination)?;

        if let Some(existing) = self.repository.find_by_destination(destination).await? {
            debug!(alias = %existing.alias, "Destination already shortened");
            return Ok(existing);
        }

        for _ in 0..MAX_ALIAS_ATTEMPTS {
            let alias = generate_alias();

            if self.repository.find_by_alias(&alias).await?.is_some() {
                continue;
            }

            let new_mapping = NewMapping {
                alias,
                destination: destination.to_string(),
                created_at: Utc::now(),
            };

            match self.repository.create(new_mapping).await {
                Ok(mapping) => {
                    metrics::counter!("mappings_created_total").increment(1);
                    info!(alias = %mapping.alias, destination, "Mapping created");
                    return Ok(mapping);
                }
                // Another writer claimed the alias between lookup and insert.
                Err(AppError::Conflict { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique alias",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Points an existing alias at a new destination.
    ///
    /// `created_at` and `expires_at` are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `new_destination` is not an absolute web URL.
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    pub async fn update(&self, alias: &str, new_destination: &str) -> Result<Mapping, AppError> {
        validate(new_destination)?;

        if !is_well_formed(alias) {
            return Err(alias_not_found(alias));
        }

        let mapping = self
            .repository
            .update_destination(alias, new_destination)
            .await?
            .ok_or_else(|| alias_not_found(alias))?;

        self.invalidate(alias).await;
        info!(alias, destination = new_destination, "Mapping destination updated");

        Ok(mapping)
    }

    /// Resolves an alias to its destination.
    ///
    /// Expiry is checked on every call, cache hits included. On a cache miss the
    /// cache is filled before returning, so the fill can never land after a
    /// later write from the same caller has invalidated the entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    /// Returns [`AppError::Expired`] if the mapping's expiry has passed.
    pub async fn resolve(&self, alias: &str) -> Result<String, AppError> {
        if !is_well_formed(alias) {
            return Err(alias_not_found(alias));
        }

        let mapping = match self.cache.get_mapping(alias).await {
            Ok(Some(cached)) => cached,
            Ok(None) => self.load_and_cache(alias).await?,
            Err(e) => {
                warn!(alias, error = %e, "Cache lookup failed, falling back to store");
                self.find(alias).await?
            }
        };

        if mapping.is_expired_at(Utc::now()) {
            metrics::counter!("alias_resolutions_total", "outcome" => "expired").increment(1);
            return Err(AppError::expired(
                "Short URL has expired",
                json!({ "alias": alias, "expires_at": mapping.expires_at }),
            ));
        }

        metrics::counter!("alias_resolutions_total", "outcome" => "found").increment(1);
        Ok(mapping.destination)
    }

    /// Sets the expiry to now plus `days_to_add` days.
    ///
    /// The window restarts from the current time; any time left on a previous
    /// expiry is discarded. Negative values produce an already expired mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    /// Returns [`AppError::Validation`] if the resulting timestamp is out of range.
    pub async fn extend_expiry(&self, alias: &str, days_to_add: i64) -> Result<Mapping, AppError> {
        if !is_well_formed(alias) {
            return Err(alias_not_found(alias));
        }

        let out_of_range = || {
            AppError::bad_request(
                "Expiry is out of range",
                json!({ "days_to_add": days_to_add }),
            )
        };

        let delta = TimeDelta::try_days(days_to_add).ok_or_else(out_of_range)?;
        let expires_at = Utc::now()
            .checked_add_signed(delta)
            .filter(|e| e.year() >= MIN_EXPIRY_YEAR)
            .ok_or_else(out_of_range)?;

        let mapping = self
            .repository
            .set_expiry(alias, Some(expires_at))
            .await?
            .ok_or_else(|| alias_not_found(alias))?;

        self.invalidate(alias).await;
        info!(alias, %expires_at, "Mapping expiry updated");

        Ok(mapping)
    }

    /// Returns the stored mapping regardless of its expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the alias does not exist.
    pub async fn get_mapping(&self, alias: &str) -> Result<Mapping, AppError> {
        self.find(alias).await
    }

    /// Lists mappings newest first together with the total count.
    pub async fn list_mappings(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<Mapping>, i64), AppError> {
        let items = self.repository.list(page, page_size).await?;
        let total = self.repository.count().await?;
        Ok((items, total))
    }

    /// Checks that the backing store answers.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Builds the public short URL for an alias.
    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.base_url, alias)
    }

    async fn find(&self, alias: &str) -> Result<Mapping, AppError> {
        self.repository
            .find_by_alias(alias)
            .await?
            .ok_or_else(|| alias_not_found(alias))
    }

    async fn load_and_cache(&self, alias: &str) -> Result<Mapping, AppError> {
        let mapping = self.find(alias).await?;

        if !mapping.is_expired()
            && let Err(e) = self.cache.set_mapping(&mapping, None).await
        {
            warn!(alias, error = %e, "Failed to cache mapping");
        }

        Ok(mapping)
    }

    async fn invalidate(&self, alias: &str) {
        if let Err(e) = self.cache.invalidate(alias).await {
            metrics::counter!("cache_invalidation_failures_total").increment(1);
            warn!(alias, error = %e, "Failed to invalidate cache; entry may be stale until its TTL");
        }
    }
}

fn validate(destination: &str) -> Result<(), AppError> {
    validate_destination(destination).map_err(|e| {
        AppError::bad_request(
            "Invalid URL",
            json!({ "url": destination, "reason": e.to_string() }),
        )
    })
}

fn alias_not_found(alias: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "alias": alias }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingRepository;
    use crate::infrastructure::cache::{CacheResult, NullCache};
    use crate::infrastructure::persistence::MemoryMappingRepository;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory cache whose writes land after `set_delay`.
    #[derive(Default)]
    struct RecordingCache {
        entries: Mutex<HashMap<String, Mapping>>,
        set_delay: std::time::Duration,
        sets: AtomicUsize,
    }

    impl RecordingCache {
        fn with_set_delay(millis: u64) -> Self {
            Self {
                set_delay: std::time::Duration::from_millis(millis),
                ..Self::default()
            }
        }

        fn cached(&self, alias: &str) -> Option<Mapping> {
            self.entries.lock().unwrap().get(alias).cloned()
        }
    }

    #[async_trait]
    impl CacheService for RecordingCache {
        async fn get_mapping(&self, alias: &str) -> CacheResult<Option<Mapping>> {
            Ok(self.cached(alias))
        }

        async fn set_mapping(&self, mapping: &Mapping, _ttl: Option<u64>) -> CacheResult<()> {
            tokio::time::sleep(self.set_delay).await;
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(mapping.alias.clone(), mapping.clone());
            Ok(())
        }

        async fn invalidate(&self, alias: &str) -> CacheResult<()> {
            self.entries.lock().unwrap().remove(alias);
            Ok(())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn mapping(alias: &str, destination: &str, expires_at: Option<DateTime<Utc>>) -> Mapping {
        Mapping::new(
            alias.to_string(),
            destination.to_string(),
            Utc::now() - Duration::days(1),
            expires_at,
        )
    }

    fn service(repo: MockMappingRepository) -> MappingService {
        MappingService::new(
            Arc::new(repo),
            Arc::new(NullCache::new()),
            "https://s.example.com/",
        )
    }

    #[tokio::test]
    async fn test_shorten_creates_new_mapping() {
        let mut repo = MockMappingRepository::new();

        repo.expect_find_by_destination()
            .withf(|d| d == "https://example.com/a")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_find_by_alias()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|m| m.destination == "https://example.com/a" && m.alias.len() == 8)
            .times(1)
            .returning(|m| Ok(Mapping::new(m.alias, m.destination, m.created_at, None)));

        let result = service(repo).shorten("https://example.com/a").await.unwrap();

        assert_eq!(result.destination, "https://example.com/a");
        assert!(result.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_shorten_returns_existing_alias() {
        let mut repo = MockMappingRepository::new();

        let existing = mapping("abc123", "https://example.com/a", None);
        repo.expect_find_by_destination()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().times(0);

        let result = service(repo).shorten("https://example.com/a").await.unwrap();

        assert_eq!(result.alias, "abc123");
    }

    #[tokio::test]
    async fn test_shorten_existing_does_not_reset_expiry() {
        let mut repo = MockMappingRepository::new();

        let expiry = Utc::now() - Duration::days(2);
        let existing = mapping("old", "https://example.com/a", Some(expiry));
        repo.expect_find_by_destination()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_set_expiry().times(0);
        repo.expect_create().times(0);

        let result = service(repo).shorten("https://example.com/a").await.unwrap();

        assert_eq!(result.alias, "old");
        assert_eq!(result.expires_at, Some(expiry));
    }

    #[tokio::test]
    async fn test_shorten_invalid_url_creates_nothing() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_destination().times(0);
        repo.expect_create().times(0);

        let result = service(repo).shorten("not a url").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_shorten_retries_on_alias_collision() {
        let mut repo = MockMappingRepository::new();

        repo.expect_find_by_destination().returning(|_| Ok(None));

        let mut lookups = 0;
        repo.expect_find_by_alias().times(2).returning(move |a| {
            lookups += 1;
            if lookups == 1 {
                Ok(Some(mapping(a, "https://taken.com", None)))
            } else {
                Ok(None)
            }
        });
        repo.expect_create()
            .times(1)
            .returning(|m| Ok(Mapping::new(m.alias, m.destination, m.created_at, None)));

        let result = service(repo).shorten("https://example.com").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_retries_on_insert_conflict() {
        let mut repo = MockMappingRepository::new();

        repo.expect_find_by_destination().returning(|_| Ok(None));
        repo.expect_find_by_alias().returning(|_| Ok(None));

        let mut inserts = 0;
        repo.expect_create().times(2).returning(move |m| {
            inserts += 1;
            if inserts == 1 {
                Err(AppError::conflict("Unique constraint violation", json!({})))
            } else {
                Ok(Mapping::new(m.alias, m.destination, m.created_at, None))
            }
        });

        assert!(service(repo).shorten("https://example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut repo = MockMappingRepository::new();

        repo.expect_find_by_destination().returning(|_| Ok(None));
        repo.expect_find_by_alias()
            .times(MAX_ALIAS_ATTEMPTS)
            .returning(|a| Ok(Some(mapping(a, "https://taken.com", None))));
        repo.expect_create().times(0);

        let result = service(repo).shorten("https://example.com").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_shorten_propagates_store_errors() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_destination()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let result = service(repo).shorten("https://example.com").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_update_overwrites_destination() {
        let mut repo = MockMappingRepository::new();
        repo.expect_update_destination()
            .withf(|a, d| a == "abc123" && d == "https://example.com/b")
            .times(1)
            .returning(|a, d| Ok(Some(mapping(a, d, None))));

        let result = service(repo)
            .update("abc123", "https://example.com/b")
            .await
            .unwrap();

        assert_eq!(result.destination, "https://example.com/b");
    }

    #[tokio::test]
    async fn test_update_missing_alias_is_not_found() {
        let mut repo = MockMappingRepository::new();
        repo.expect_update_destination()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_create().times(0);

        let result = service(repo).update("missing", "https://example.com").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_url() {
        let mut repo = MockMappingRepository::new();
        repo.expect_update_destination().times(0);

        let result = service(repo).update("abc123", "ftp://example.com").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_resolve_returns_destination() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias()
            .withf(|a| a == "abc123")
            .returning(|a| Ok(Some(mapping(a, "https://example.com/a", None))));

        let destination = service(repo).resolve("abc123").await.unwrap();

        assert_eq!(destination, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_resolve_future_expiry_is_active() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|a| {
            Ok(Some(mapping(
                a,
                "https://example.com/a",
                Some(Utc::now() + Duration::hours(1)),
            )))
        });

        assert!(service(repo).resolve("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_expired_mapping() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|a| {
            Ok(Some(mapping(
                a,
                "https://example.com/a",
                Some(Utc::now() - Duration::seconds(1)),
            )))
        });

        let result = service(repo).resolve("abc123").await;

        assert!(matches!(result, Err(AppError::Expired { .. })));
    }

    #[tokio::test]
    async fn test_resolve_missing_alias() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|_| Ok(None));

        let result = service(repo).resolve("nope").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_extend_expiry_sets_now_plus_days() {
        let mut repo = MockMappingRepository::new();
        repo.expect_set_expiry()
            .withf(|a, e| a == "abc123" && e.is_some())
            .times(1)
            .returning(|a, e| Ok(Some(mapping(a, "https://example.com", e))));

        let before = Utc::now();
        let result = service(repo).extend_expiry("abc123", 7).await.unwrap();
        let after = Utc::now();

        let expires_at = result.expires_at.unwrap();
        assert!(expires_at >= before + Duration::days(7));
        assert!(expires_at <= after + Duration::days(7));
    }

    #[tokio::test]
    async fn test_extend_expiry_negative_days_is_accepted() {
        let mut repo = MockMappingRepository::new();
        repo.expect_set_expiry()
            .times(1)
            .returning(|a, e| Ok(Some(mapping(a, "https://example.com", e))));

        let result = service(repo).extend_expiry("abc123", -1).await.unwrap();

        assert!(result.is_expired());
    }

    #[tokio::test]
    async fn test_extend_expiry_missing_alias() {
        let mut repo = MockMappingRepository::new();
        repo.expect_set_expiry().returning(|_, _| Ok(None));

        let result = service(repo).extend_expiry("missing", 3).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_extend_expiry_out_of_range() {
        let mut repo = MockMappingRepository::new();
        repo.expect_set_expiry().times(0);

        let result = service(repo).extend_expiry("abc123", i64::MAX).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_mapping_ignores_expiry() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|a| {
            Ok(Some(mapping(
                a,
                "https://example.com",
                Some(Utc::now() - Duration::days(1)),
            )))
        });

        let result = service(repo).get_mapping("abc123").await.unwrap();

        assert!(result.is_expired());
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let svc = service(MockMappingRepository::new());
        assert_eq!(svc.short_url("abc123"), "https://s.example.com/abc123");
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_alias_as_not_found() {
        let mut repo = MockMappingRepository::new();
        repo.expect_update_destination().times(0);

        let result = service(repo)
            .update("www.ppa.in/abc", "https://example.com")
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_extend_expiry_malformed_alias_is_not_found() {
        let mut repo = MockMappingRepository::new();
        repo.expect_set_expiry().times(0);

        let result = service(repo).extend_expiry("no.such", 1).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_extend_expiry_before_year_one_is_out_of_range() {
        let mut repo = MockMappingRepository::new();
        repo.expect_set_expiry().times(0);
        let svc = service(repo);

        for days in [-1_000_000, -90_000_000, i64::MIN] {
            let result = svc.extend_expiry("abc123", days).await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "days_to_add = {days}"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_fills_cache_before_returning() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias()
            .times(1)
            .returning(|a| Ok(Some(mapping(a, "https://example.com/a", None))));

        let cache = Arc::new(RecordingCache::with_set_delay(20));
        let svc = MappingService::new(Arc::new(repo), cache.clone(), "https://s.example.com");

        assert_eq!(svc.resolve("abc123").await.unwrap(), "https://example.com/a");
        assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
        assert!(cache.cached("abc123").is_some());

        // Served from the cache; the store is not queried again.
        assert_eq!(svc.resolve("abc123").await.unwrap(), "https://example.com/a");
    }

    #[tokio::test]
    async fn test_resolve_does_not_cache_expired_mapping() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|a| {
            Ok(Some(mapping(
                a,
                "https://example.com",
                Some(Utc::now() - Duration::seconds(1)),
            )))
        });

        let cache = Arc::new(RecordingCache::default());
        let svc = MappingService::new(Arc::new(repo), cache.clone(), "https://s.example.com");

        assert!(matches!(
            svc.resolve("abc123").await,
            Err(AppError::Expired { .. })
        ));
        assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_writes_are_visible_through_slow_cache() {
        let repo = Arc::new(MemoryMappingRepository::new());
        let cache = Arc::new(RecordingCache::with_set_delay(50));
        let svc = MappingService::new(repo, cache.clone(), "https://s.example.com");

        let alias = svc.shorten("https://example.com/old").await.unwrap().alias;
        assert_eq!(svc.resolve(&alias).await.unwrap(), "https://example.com/old");

        svc.update(&alias, "https://example.com/new").await.unwrap();
        assert!(cache.cached(&alias).is_none());
        assert_eq!(svc.resolve(&alias).await.unwrap(), "https://example.com/new");

        svc.extend_expiry(&alias, -1).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(150)).await;

        assert!(cache.cached(&alias).is_none());
        assert!(matches!(
            svc.resolve(&alias).await,
            Err(AppError::Expired { .. })
        ));
    }
}
