//! Environment-driven configuration.
//!
//! [`load_from_env`] reads every setting once at startup and rejects bad values
//! before anything connects. `.env` files are loaded by the binaries.
//!
//! | Variable | Default | Notes |
//! |---|---|---|
//! | `STORAGE_BACKEND` | `postgres` | `postgres` or `memory` (lost on restart) |
//! | `DATABASE_URL` | - | Or `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` |
//! | `DB_MAX_CONNECTIONS` | `10` | Pool size |
//! | `DB_CONNECT_TIMEOUT` | `30` | Seconds to wait for a pooled connection |
//! | `DB_IDLE_TIMEOUT` | `600` | Seconds before an idle connection is closed |
//! | `DB_MAX_LIFETIME` | `1800` | Seconds before any connection is recycled |
//! | `REDIS_URL` | unset | Or `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`; unset disables caching |
//! | `CACHE_TTL_SECONDS` | `3600` | Upper bound on a cached mapping's lifetime |
//! | `BASE_URL` | `http://localhost:3000` | Prefix of every issued short URL |
//! | `LISTEN` | `0.0.0.0:3000` | Bind address |
//! | `RUST_LOG` | `info` | `tracing` filter directive |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `BEHIND_PROXY` | `false` | Rate-limit on forwarded client IPs |
//!
//! Component variables are only consulted when the matching `*_URL` is unset.
//! Passwords given that way are percent-encoded into the URL.

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Where mappings are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        })
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        }
    }
}

/// Connection settings for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Selected store together with whatever it needs to connect.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres(PgSettings),
    Memory,
}

impl StorageConfig {
    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Postgres(_) => StorageBackend::Postgres,
            Self::Memory => StorageBackend::Memory,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    /// `None` disables caching.
    pub redis_url: Option<String>,
    pub cache_ttl_seconds: u64,
    /// Joined with an alias to form the public short URL.
    pub base_url: String,
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Key rate limits on `X-Forwarded-For` / `X-Real-IP`. Trusted proxies only.
    pub behind_proxy: bool,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails on unknown enum values, unparsable numbers or addresses, and when
    /// the postgres backend is selected without database settings.
    pub fn from_env() -> Result<Self> {
        let storage = match parse_env("STORAGE_BACKEND", StorageBackend::Postgres)? {
            StorageBackend::Memory => StorageConfig::Memory,
            StorageBackend::Postgres => StorageConfig::Postgres(PgSettings {
                url: database_url_from_env().context("Failed to load database configuration")?,
                max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_secs(parse_env("DB_CONNECT_TIMEOUT", 30)?),
                idle_timeout: Duration::from_secs(parse_env("DB_IDLE_TIMEOUT", 600)?),
                max_lifetime: Duration::from_secs(parse_env("DB_MAX_LIFETIME", 1800)?),
            }),
        };

        Ok(Self {
            storage,
            redis_url: redis_url_from_env()?,
            cache_ttl_seconds: parse_env("CACHE_TTL_SECONDS", 3600)?,
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
            listen_addr: parse_env("LISTEN", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
            log_format: parse_env("LOG_FORMAT", LogFormat::Text)?,
            behind_proxy: env::var("BEHIND_PROXY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Checks cross-field constraints that parsing alone cannot.
    ///
    /// # Errors
    ///
    /// Fails when `BASE_URL` is not http(s), a connection URL has the wrong
    /// scheme, or a size or duration is zero.
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("BASE_URL is not a valid URL: '{}'", self.base_url))?;
        anyhow::ensure!(
            matches!(base.scheme(), "http" | "https"),
            "BASE_URL must be an http(s) URL, got '{}'",
            self.base_url
        );

        if let StorageConfig::Postgres(pg) = &self.storage {
            ensure_scheme("DATABASE_URL", &pg.url, &["postgres", "postgresql"])?;
            anyhow::ensure!(pg.max_connections > 0, "DB_MAX_CONNECTIONS must be at least 1");
            anyhow::ensure!(
                !pg.acquire_timeout.is_zero(),
                "DB_CONNECT_TIMEOUT must be greater than 0"
            );
        }

        if let Some(redis_url) = &self.redis_url {
            ensure_scheme("REDIS_URL", redis_url, &["redis", "rediss"])?;
        }

        anyhow::ensure!(
            self.cache_ttl_seconds > 0,
            "CACHE_TTL_SECONDS must be greater than 0"
        );

        Ok(())
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Logs the effective configuration with credentials masked.
    pub fn print_summary(&self) {
        tracing::info!(
            listen = %self.listen_addr,
            base_url = %self.base_url,
            storage = %self.storage.backend(),
            log_format = ?self.log_format,
            "Configuration loaded"
        );

        if let StorageConfig::Postgres(pg) = &self.storage {
            tracing::info!(
                database = %mask_connection_string(&pg.url),
                max_connections = pg.max_connections,
                "Database settings"
            );
        }

        match &self.redis_url {
            Some(url) => tracing::info!(
                redis = %mask_connection_string(url),
                ttl_seconds = self.cache_ttl_seconds,
                "Cache enabled"
            ),
            None => tracing::info!("Cache disabled"),
        }
    }
}

/// Parses `key` from the environment, using `default` when it is unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

fn ensure_scheme(name: &str, value: &str, schemes: &[&str]) -> Result<()> {
    let scheme = Url::parse(value).map(|u| u.scheme().to_string()).ok();
    anyhow::ensure!(
        scheme.as_deref().is_some_and(|s| schemes.contains(&s)),
        "{name} must use one of the schemes {schemes:?}, got '{}'",
        mask_connection_string(value)
    );
    Ok(())
}

/// `DATABASE_URL`, or a URL assembled from the `DB_*` components.
fn database_url_from_env() -> Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let required = |key: &str| {
        env::var(key).with_context(|| format!("{key} must be set when DATABASE_URL is not"))
    };
    let user = required("DB_USER")?;
    let password = required("DB_PASSWORD")?;
    let name = required("DB_NAME")?;
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".into());
    let port: u16 = parse_env("DB_PORT", 5432)?;

    let mut url = Url::parse(&format!("postgres://{host}:{port}"))
        .with_context(|| format!("Invalid DB_HOST '{host}'"))?;
    url.set_path(&name);
    url.set_username(&user)
        .and_then(|()| url.set_password(Some(&password)))
        .map_err(|()| anyhow::anyhow!("Cannot put credentials into a URL for host '{host}'"))?;

    Ok(url.into())
}

/// `REDIS_URL`, or a URL assembled from the `REDIS_*` components.
///
/// `Ok(None)` when neither is present.
fn redis_url_from_env() -> Result<Option<String>> {
    if let Ok(url) = env::var("REDIS_URL") {
        return Ok(Some(url));
    }

    let Ok(host) = env::var("REDIS_HOST") else {
        return Ok(None);
    };
    let port: u16 = parse_env("REDIS_PORT", 6379)?;
    let db: u32 = parse_env("REDIS_DB", 0)?;

    let mut url = Url::parse(&format!("redis://{host}:{port}/{db}"))
        .with_context(|| format!("Invalid REDIS_HOST '{host}'"))?;
    if let Ok(password) = env::var("REDIS_PASSWORD")
        && !password.is_empty()
    {
        url.set_password(Some(&password))
            .map_err(|()| anyhow::anyhow!("Cannot put a password into a URL for host '{host}'"))?;
    }

    Ok(Some(url.into()))
}

/// Replaces the password of a connection URL with `***` for logging.
///
/// Strings that do not parse as URLs are hidden entirely.
pub fn mask_connection_string(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                // Only fails for URLs without a host, which carry no password.
                let _ = url.set_password(Some("***"));
            }
            url.into()
        }
        Err(_) => "***".to_string(),
    }
}

/// Loads and validates configuration from the environment.
///
/// Expects `.env` to have been applied already (`dotenvy::dotenv()`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
