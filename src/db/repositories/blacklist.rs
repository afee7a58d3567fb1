//! Blacklist repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::BlacklistEntry;

/// Blacklist repository trait
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// Add a pattern. Returns false when the pattern already exists.
    async fn add(&self, pattern: &str, reason: Option<&str>) -> Result<bool>;

    /// All stored patterns
    async fn patterns(&self) -> Result<Vec<String>>;

    /// All stored entries
    async fn list(&self) -> Result<Vec<BlacklistEntry>>;
}

/// Blacklist repository implementation
pub struct SqlxBlacklistRepository {
    pool: DynDatabasePool,
}

impl SqlxBlacklistRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistRepository for SqlxBlacklistRepository {
    async fn add(&self, pattern: &str, reason: Option<&str>) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(
                "INSERT OR IGNORE INTO blacklist (pattern, reason, created_at) VALUES (?, ?, ?)",
            )
            .bind(pattern)
            .bind(reason)
            .bind(Utc::now())
            .execute(self.pool.as_sqlite().unwrap())
            .await?
            .rows_affected(),
            DatabaseDriver::Postgres => sqlx::query(
                "INSERT INTO blacklist (pattern, reason, created_at) VALUES ($1, $2, $3)
                 ON CONFLICT (pattern) DO NOTHING",
            )
            .bind(pattern)
            .bind(reason)
            .bind(Utc::now())
            .execute(self.pool.as_postgres().unwrap())
            .await?
            .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn patterns(&self) -> Result<Vec<String>> {
        let patterns = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar("SELECT pattern FROM blacklist ORDER BY id")
                    .fetch_all(self.pool.as_sqlite().unwrap())
                    .await?
            }
            DatabaseDriver::Postgres => {
                sqlx::query_scalar("SELECT pattern FROM blacklist ORDER BY id")
                    .fetch_all(self.pool.as_postgres().unwrap())
                    .await?
            }
        };
        Ok(patterns)
    }

    async fn list(&self) -> Result<Vec<BlacklistEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Postgres => list_postgres(self.pool.as_postgres().unwrap()).await,
        }
    }
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<BlacklistEntry>> {
    let rows = sqlx::query("SELECT id, pattern, reason, created_at FROM blacklist ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| BlacklistEntry {
            id: r.get("id"),
            pattern: r.get("pattern"),
            reason: r.get("reason"),
            created_at: r.get("created_at"),
        })
        .collect())
}

async fn list_postgres(pool: &PgPool) -> Result<Vec<BlacklistEntry>> {
    let rows = sqlx::query("SELECT id, pattern, reason, created_at FROM blacklist ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| BlacklistEntry {
            id: r.get("id"),
            pattern: r.get("pattern"),
            reason: r.get("reason"),
            created_at: r.get("created_at"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn test_add_and_list() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let repo = SqlxBlacklistRepository::new(pool.clone());

        assert!(repo.add("malware", Some("seeded")).await.unwrap());
        // Duplicate is ignored
        assert!(!repo.add("malware", None).await.unwrap());
        assert!(repo.add("phishing", None).await.unwrap());

        let patterns = repo.patterns().await.unwrap();
        assert_eq!(patterns, vec!["malware".to_string(), "phishing".to_string()]);

        let entries = repo.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].reason.as_deref(), Some("seeded"));
    }
}
