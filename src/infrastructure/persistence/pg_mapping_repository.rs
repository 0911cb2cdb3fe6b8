//! PostgreSQL implementation of the mapping repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Mapping, NewMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;

/// Row shape shared by every query that returns a mapping.
#[derive(Debug, sqlx::FromRow)]
struct MappingRow {
    alias: String,
    destination: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<MappingRow> for Mapping {
    fn from(r: MappingRow) -> Self {
        Mapping::new(r.alias, r.destination, r.created_at, r.expires_at)
    }
}

/// PostgreSQL repository for the `mappings` table.
///
/// Each method issues exactly one statement, so updates are atomic per row
/// without explicit transactions.
pub struct PgMappingRepository {
    pool: Arc<PgPool>,
}

impl PgMappingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MappingRepository for PgMappingRepository {
    async fn create(&self, new_mapping: NewMapping) -> Result<Mapping, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            INSERT INTO mappings (alias, destination, created_at)
            VALUES ($1, $2, $3)
            RETURNING alias, destination, created_at, expires_at
            "#,
        )
        .bind(&new_mapping.alias)
        .bind(&new_mapping.destination)
        .bind(new_mapping.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT alias, destination, created_at, expires_at
            FROM mappings
            WHERE alias = $1
            "#,
        )
        .bind(alias)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn find_by_destination(&self, destination: &str) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT alias, destination, created_at, expires_at
            FROM mappings
            WHERE destination = $1
            ORDER BY created_at ASC, alias ASC
            LIMIT 1
            "#,
        )
        .bind(destination)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn update_destination(
        &self,
        alias: &str,
        destination: &str,
    ) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            UPDATE mappings
            SET destination = $2
            WHERE alias = $1
            RETURNING alias, destination, created_at, expires_at
            "#,
        )
        .bind(alias)
        .bind(destination)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn set_expiry(
        &self,
        alias: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Mapping>, AppError> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            UPDATE mappings
            SET expires_at = $2
            WHERE alias = $1
            RETURNING alias, destination, created_at, expires_at
            "#,
        )
        .bind(alias)
        .bind(expires_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Mapping::from))
    }

    async fn list(&self, page: i64, page_size: i64) -> Result<Vec<Mapping>, AppError> {
        let offset = (page - 1) * page_size;

        let rows = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT alias, destination, created_at, expires_at
            FROM mappings
            ORDER BY created_at DESC, alias ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page_size)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Mapping::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mappings")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
