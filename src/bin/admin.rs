//! CLI administration tool for url-alias.
//!
//! Runs mapping operations directly against the configured store, without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a destination
//! cargo run --bin admin -- shorten https://example.com/a
//!
//! # Resolve an alias
//! cargo run --bin admin -- resolve Xk3_a9Qz
//!
//! # Point an alias somewhere else
//! cargo run --bin admin -- update Xk3_a9Qz https://example.com/b
//!
//! # Expire in 30 days (negative values expire immediately)
//! cargo run --bin admin -- expire Xk3_a9Qz 30
//!
//! # List mappings
//! cargo run --bin admin -- list --page 1 --page-size 20
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`url_alias::config`].

use url_alias::application::services::MappingService;
use url_alias::config::{self, StorageBackend};
use url_alias::domain::entities::MappingStatus;
use url_alias::error::AppError;
use url_alias::infrastructure::cache::NullCache;
use url_alias::server::build_repository;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing url-alias mappings.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Get or create the alias for a destination URL
    Shorten {
        /// Absolute http(s) URL
        destination: String,
    },

    /// Show where an alias redirects
    Resolve {
        alias: String,
    },

    /// Point an alias at a new destination
    Update {
        alias: String,
        destination: String,
    },

    /// Set an alias to expire a number of days from now
    Expire {
        alias: String,

        /// Days from now; negative values expire the alias immediately
        #[arg(allow_hyphen_values = true)]
        days: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List mappings, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    if config.storage.backend() == StorageBackend::Memory {
        println!(
            "{}",
            "⚠️  STORAGE_BACKEND=memory: changes are discarded when this command exits".yellow()
        );
    }

    let repository = build_repository(&config).await?;
    let service = MappingService::new(repository, Arc::new(NullCache::new()), config.base_url);

    match cli.command {
        Commands::Shorten { destination } => shorten(&service, &destination).await?,
        Commands::Resolve { alias } => resolve(&service, &alias).await?,
        Commands::Update { alias, destination } => update(&service, &alias, &destination).await?,
        Commands::Expire { alias, days, yes } => expire(&service, &alias, days, yes).await?,
        Commands::List { page, page_size } => list(&service, page, page_size).await?,
        Commands::Db { action } => handle_db_action(action, &service).await?,
    }

    Ok(())
}

/// Converts a service error into a CLI error with its message.
fn cli_error(e: AppError) -> anyhow::Error {
    anyhow::anyhow!("{}", e)
}

async fn shorten(service: &MappingService, destination: &str) -> Result<()> {
    let mapping = service.shorten(destination).await.map_err(cli_error)?;

    println!("{}", "✅ Shortened".green().bold());
    println!("  Alias:     {}", mapping.alias.bright_yellow().bold());
    println!("  Short URL: {}", service.short_url(&mapping.alias).cyan());
    println!("  Target:    {}", mapping.destination);

    Ok(())
}

async fn resolve(service: &MappingService, alias: &str) -> Result<()> {
    match service.resolve(alias).await {
        Ok(destination) => {
            println!("  {} → {}", alias.bright_yellow(), destination.cyan());
            Ok(())
        }
        Err(AppError::Expired { .. }) => {
            println!("{}", format!("⌛ {} has expired", alias).red());
            Ok(())
        }
        Err(e) => Err(cli_error(e)),
    }
}

async fn update(service: &MappingService, alias: &str, destination: &str) -> Result<()> {
    service
        .update(alias, destination)
        .await
        .map_err(cli_error)?;

    println!("{}", "✅ Destination updated".green().bold());
    println!("  {} → {}", alias.bright_yellow(), destination.cyan());

    Ok(())
}

/// Restarts an alias's expiry window.
///
/// Asks for confirmation when `days` is not positive, since that makes the
/// alias stop resolving immediately.
async fn expire(service: &MappingService, alias: &str, days: i64, skip_confirm: bool) -> Result<()> {
    if days <= 0 && !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("{} will stop resolving now. Continue?", alias))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let mapping = service
        .extend_expiry(alias, days)
        .await
        .map_err(cli_error)?;

    println!("{}", "✅ Expiry updated".green().bold());
    if let Some(expires_at) = mapping.expires_at {
        println!(
            "  Expires: {}",
            expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().cyan()
        );
    }

    Ok(())
}

/// Lists mappings in a table.
///
/// # Output Format
///
/// ```text
///   Alias      Status   Expires            Destination
///   ─────────────────────────────────────────────────────────────
///   Xk3_a9Qz   ACTIVE   -                  https://example.com/a
/// ```
async fn list(service: &MappingService, page: i64, page_size: i64) -> Result<()> {
    if page < 1 || page_size < 1 {
        anyhow::bail!("--page and --page-size must be at least 1");
    }

    let (mappings, total) = service
        .list_mappings(page, page_size)
        .await
        .map_err(cli_error)?;

    if mappings.is_empty() {
        println!("{}", "  No mappings found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<8} {:<18} {}",
        "Alias".bright_white().bold(),
        "Status".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    let now = Utc::now();
    for mapping in &mappings {
        let status = match mapping.status_at(now) {
            MappingStatus::Active => "ACTIVE".green(),
            MappingStatus::Expired => "EXPIRED".red(),
        };
        let expires = mapping
            .expires_at
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<12} {:<8} {:<18} {}",
            mapping.alias.cyan(),
            status,
            expires.bright_black(),
            mapping.destination
        );
    }

    println!();
    println!(
        "  Page {} · showing {} of {}",
        page,
        mappings.len(),
        total.to_string().bright_white().bold()
    );

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, service: &MappingService) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking store connection...".bright_blue());
            service.ping().await.map_err(cli_error)?;
            println!("{}", "✅ Store connection OK".green().bold());
        }
    }

    Ok(())
}
