//! HTTP server initialization and runtime setup.
//!
//! Builds the mapping store, cache and service from [`Config`], then runs the
//! Axum server until a shutdown signal arrives.

use crate::application::services::MappingService;
use crate::config::{Config, PgSettings, StorageConfig};
use crate::domain::repositories::MappingRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryMappingRepository, PgMappingRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The mapping store (PostgreSQL with migrations, or in-memory)
/// - Redis cache (or NullCache fallback)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;
    let cache = build_cache(&config).await;

    let mapping_service = Arc::new(MappingService::new(
        repository,
        cache.clone(),
        config.base_url.clone(),
    ));
    let state = AppState::new(mapping_service, cache);

    let app = app_router(state, config.behind_proxy);

    let addr = config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Connects to the configured store, applying migrations for PostgreSQL.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn MappingRepository>> {
    match &config.storage {
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; mappings are lost on restart");
            Ok(Arc::new(MemoryMappingRepository::new()))
        }
        StorageConfig::Postgres(pg) => {
            let pool = connect_pool(pg).await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Migrations applied");

            Ok(Arc::new(PgMappingRepository::new(Arc::new(pool))))
        }
    }
}

async fn connect_pool(pg: &PgSettings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(pg.max_connections)
        .acquire_timeout(pg.acquire_timeout)
        .idle_timeout(pg.idle_timeout)
        .max_lifetime(pg.max_lifetime)
        .connect(&pg.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
///
/// A signal that cannot be installed never fires; it does not count as a
/// shutdown request.
async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

async fn shutdown_on<F>(ctrl_c_signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    let ctrl_c = async {
        if let Err(e) = ctrl_c_signal.await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
