//! Paste repository
//!
//! Owns the pastes table plus the paste_likes table, since likes only exist
//! as a counter on their paste. Counter updates (views, likes,
//! comments_count) are single atomic SQL statements.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePasteInput, Paste, PasteStatistics};

/// Weight of a like relative to a view in the trending score
const TRENDING_LIKE_WEIGHT: i64 = 5;

/// Paste repository trait
#[async_trait]
pub trait PasteRepository: Send + Sync {
    /// Insert a new paste
    async fn create(
        &self,
        input: &CreatePasteInput,
        short_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Paste>;

    /// Get a paste by numeric id
    async fn get_by_id(&self, id: i64) -> Result<Option<Paste>>;

    /// Get a paste by its short URL
    async fn get_by_short_url(&self, short_url: &str) -> Result<Option<Paste>>;

    /// Atomically increment the view counter
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Public, unexpired pastes created after `cutoff` (or all time),
    /// ranked by the weighted views+likes score
    async fn trending(
        &self,
        limit: i64,
        cutoff: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Paste>>;

    /// Public, unexpired pastes, newest first
    async fn latest(&self, limit: i64, now: DateTime<Utc>) -> Result<Vec<Paste>>;

    /// Delete a paste (cascades comments, likes and reports)
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Record a like from an IP. Returns false when this IP already liked
    /// the paste; the counter is only bumped on a fresh like.
    async fn add_like(&self, paste_id: i64, ip_address: &str) -> Result<bool>;

    /// Remove a like from an IP. Returns false when there was none.
    async fn remove_like(&self, paste_id: i64, ip_address: &str) -> Result<bool>;

    /// Check whether an IP has liked a paste
    async fn has_liked(&self, paste_id: i64, ip_address: &str) -> Result<bool>;

    /// Aggregate counters for the info endpoint
    async fn statistics(&self, now: DateTime<Utc>) -> Result<PasteStatistics>;
}

/// Paste repository implementation
pub struct SqlxPasteRepository {
    pool: DynDatabasePool,
}

impl SqlxPasteRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasteRepository for SqlxPasteRepository {
    async fn create(
        &self,
        input: &CreatePasteInput,
        short_url: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Paste> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), input, short_url, expires_at).await
            }
            DatabaseDriver::Postgres => {
                create_postgres(self.pool.as_postgres().unwrap(), input, short_url, expires_at)
                    .await
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Paste>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Postgres => {
                get_by_id_postgres(self.pool.as_postgres().unwrap(), id).await
            }
        }
    }

    async fn get_by_short_url(&self, short_url: &str) -> Result<Option<Paste>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_short_url_sqlite(self.pool.as_sqlite().unwrap(), short_url).await
            }
            DatabaseDriver::Postgres => {
                get_by_short_url_postgres(self.pool.as_postgres().unwrap(), short_url).await
            }
        }
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("UPDATE pastes SET views = views + 1 WHERE id = ?")
                    .bind(id)
                    .execute(self.pool.as_sqlite().unwrap())
                    .await?;
            }
            DatabaseDriver::Postgres => {
                sqlx::query("UPDATE pastes SET views = views + 1 WHERE id = $1")
                    .bind(id)
                    .execute(self.pool.as_postgres().unwrap())
                    .await?;
            }
        }
        Ok(())
    }

    async fn trending(
        &self,
        limit: i64,
        cutoff: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Paste>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                trending_sqlite(self.pool.as_sqlite().unwrap(), limit, cutoff, now).await
            }
            DatabaseDriver::Postgres => {
                trending_postgres(self.pool.as_postgres().unwrap(), limit, cutoff, now).await
            }
        }
    }

    async fn latest(&self, limit: i64, now: DateTime<Utc>) -> Result<Vec<Paste>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                latest_sqlite(self.pool.as_sqlite().unwrap(), limit, now).await
            }
            DatabaseDriver::Postgres => {
                latest_postgres(self.pool.as_postgres().unwrap(), limit, now).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query("DELETE FROM pastes WHERE id = ?")
                .bind(id)
                .execute(self.pool.as_sqlite().unwrap())
                .await?
                .rows_affected(),
            DatabaseDriver::Postgres => sqlx::query("DELETE FROM pastes WHERE id = $1")
                .bind(id)
                .execute(self.pool.as_postgres().unwrap())
                .await?
                .rows_affected(),
        };
        Ok(affected > 0)
    }

    async fn add_like(&self, paste_id: i64, ip_address: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_like_sqlite(self.pool.as_sqlite().unwrap(), paste_id, ip_address).await
            }
            DatabaseDriver::Postgres => {
                add_like_postgres(self.pool.as_postgres().unwrap(), paste_id, ip_address).await
            }
        }
    }

    async fn remove_like(&self, paste_id: i64, ip_address: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                remove_like_sqlite(self.pool.as_sqlite().unwrap(), paste_id, ip_address).await
            }
            DatabaseDriver::Postgres => {
                remove_like_postgres(self.pool.as_postgres().unwrap(), paste_id, ip_address).await
            }
        }
    }

    async fn has_liked(&self, paste_id: i64, ip_address: &str) -> Result<bool> {
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query_scalar(
                "SELECT COUNT(*) FROM paste_likes WHERE paste_id = ? AND ip_address = ?",
            )
            .bind(paste_id)
            .bind(ip_address)
            .fetch_one(self.pool.as_sqlite().unwrap())
            .await?,
            DatabaseDriver::Postgres => sqlx::query_scalar(
                "SELECT COUNT(*) FROM paste_likes WHERE paste_id = $1 AND ip_address = $2",
            )
            .bind(paste_id)
            .bind(ip_address)
            .fetch_one(self.pool.as_postgres().unwrap())
            .await?,
        };
        Ok(count > 0)
    }

    async fn statistics(&self, now: DateTime<Utc>) -> Result<PasteStatistics> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => statistics_sqlite(self.pool.as_sqlite().unwrap(), now).await,
            DatabaseDriver::Postgres => {
                statistics_postgres(self.pool.as_postgres().unwrap(), now).await
            }
        }
    }
}

fn map_row_sqlite(row: &sqlx::sqlite::SqliteRow) -> Paste {
    Paste {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        syntax: row.get::<String, _>("syntax").parse().unwrap_or_default(),
        expiration: row
            .get::<String, _>("expiration")
            .parse()
            .unwrap_or_default(),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
        views: row.get("views"),
        likes: row.get("likes"),
        comments_count: row.get("comments_count"),
        is_private: row.get("is_private"),
        short_url: row.get("short_url"),
    }
}

fn map_row_postgres(row: &sqlx::postgres::PgRow) -> Paste {
    Paste {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        syntax: row.get::<String, _>("syntax").parse().unwrap_or_default(),
        expiration: row
            .get::<String, _>("expiration")
            .parse()
            .unwrap_or_default(),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
        views: row.get("views"),
        likes: row.get("likes"),
        comments_count: row.get("comments_count"),
        is_private: row.get("is_private"),
        short_url: row.get("short_url"),
    }
}

// Listings only show public, unexpired pastes.
const VISIBLE_SQLITE: &str = "is_private = 0 AND (expires_at IS NULL OR expires_at > ?)";
const VISIBLE_POSTGRES: &str = "is_private = FALSE AND (expires_at IS NULL OR expires_at > $1)";

// SQLite implementations

async fn create_sqlite(
    pool: &SqlitePool,
    input: &CreatePasteInput,
    short_url: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Paste> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"INSERT INTO pastes (title, content, syntax, expiration, expires_at, created_at, is_private, short_url)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.syntax.to_string())
    .bind(input.expiration.to_string())
    .bind(expires_at)
    .bind(now)
    .bind(input.is_private)
    .bind(short_url)
    .execute(pool)
    .await?;

    Ok(Paste {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        content: input.content.clone(),
        syntax: input.syntax,
        expiration: input.expiration,
        expires_at,
        created_at: now,
        views: 0,
        likes: 0,
        comments_count: 0,
        is_private: input.is_private,
        short_url: short_url.to_string(),
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Paste>> {
    let row = sqlx::query("SELECT * FROM pastes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| map_row_sqlite(&r)))
}

async fn get_by_short_url_sqlite(pool: &SqlitePool, short_url: &str) -> Result<Option<Paste>> {
    let row = sqlx::query("SELECT * FROM pastes WHERE short_url = ?")
        .bind(short_url)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| map_row_sqlite(&r)))
}

async fn trending_sqlite(
    pool: &SqlitePool,
    limit: i64,
    cutoff: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Vec<Paste>> {
    let rows = if let Some(cutoff) = cutoff {
        sqlx::query(&format!(
            "SELECT * FROM pastes WHERE {} AND created_at > ?
             ORDER BY views + likes * {} DESC, created_at DESC LIMIT ?",
            VISIBLE_SQLITE, TRENDING_LIKE_WEIGHT
        ))
        .bind(now)
        .bind(cutoff)
        .bind(limit)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query(&format!(
            "SELECT * FROM pastes WHERE {}
             ORDER BY views + likes * {} DESC, created_at DESC LIMIT ?",
            VISIBLE_SQLITE, TRENDING_LIKE_WEIGHT
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await?
    };

    Ok(rows.iter().map(map_row_sqlite).collect())
}

async fn latest_sqlite(pool: &SqlitePool, limit: i64, now: DateTime<Utc>) -> Result<Vec<Paste>> {
    let rows = sqlx::query(&format!(
        "SELECT * FROM pastes WHERE {} ORDER BY created_at DESC, id DESC LIMIT ?",
        VISIBLE_SQLITE
    ))
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_row_sqlite).collect())
}

async fn add_like_sqlite(pool: &SqlitePool, paste_id: i64, ip_address: &str) -> Result<bool> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO paste_likes (paste_id, ip_address) VALUES (?, ?)")
            .bind(paste_id)
            .bind(ip_address)
            .execute(pool)
            .await?;

    if result.rows_affected() > 0 {
        sqlx::query("UPDATE pastes SET likes = likes + 1 WHERE id = ?")
            .bind(paste_id)
            .execute(pool)
            .await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

async fn remove_like_sqlite(pool: &SqlitePool, paste_id: i64, ip_address: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM paste_likes WHERE paste_id = ? AND ip_address = ?")
        .bind(paste_id)
        .bind(ip_address)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        sqlx::query("UPDATE pastes SET likes = MAX(0, likes - 1) WHERE id = ?")
            .bind(paste_id)
            .execute(pool)
            .await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

async fn statistics_sqlite(pool: &SqlitePool, now: DateTime<Utc>) -> Result<PasteStatistics> {
    let row = sqlx::query(
        r#"SELECT
             COUNT(*) AS total_pastes,
             COALESCE(SUM(views), 0) AS total_views,
             COALESCE(SUM(CASE WHEN expires_at IS NULL OR expires_at > ? THEN 1 ELSE 0 END), 0) AS active_pastes,
             (SELECT COUNT(*) FROM comments) AS total_comments
           FROM pastes"#,
    )
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(PasteStatistics {
        total_pastes: row.get("total_pastes"),
        active_pastes: row.get("active_pastes"),
        total_views: row.get("total_views"),
        total_comments: row.get("total_comments"),
    })
}

// PostgreSQL implementations

async fn create_postgres(
    pool: &PgPool,
    input: &CreatePasteInput,
    short_url: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Paste> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"INSERT INTO pastes (title, content, syntax, expiration, expires_at, created_at, is_private, short_url)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
           RETURNING id"#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.syntax.to_string())
    .bind(input.expiration.to_string())
    .bind(expires_at)
    .bind(now)
    .bind(input.is_private)
    .bind(short_url)
    .fetch_one(pool)
    .await?;

    Ok(Paste {
        id,
        title: input.title.clone(),
        content: input.content.clone(),
        syntax: input.syntax,
        expiration: input.expiration,
        expires_at,
        created_at: now,
        views: 0,
        likes: 0,
        comments_count: 0,
        is_private: input.is_private,
        short_url: short_url.to_string(),
    })
}

async fn get_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<Paste>> {
    let row = sqlx::query("SELECT * FROM pastes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| map_row_postgres(&r)))
}

async fn get_by_short_url_postgres(pool: &PgPool, short_url: &str) -> Result<Option<Paste>> {
    let row = sqlx::query("SELECT * FROM pastes WHERE short_url = $1")
        .bind(short_url)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| map_row_postgres(&r)))
}

async fn trending_postgres(
    pool: &PgPool,
    limit: i64,
    cutoff: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Vec<Paste>> {
    let rows = if let Some(cutoff) = cutoff {
        sqlx::query(&format!(
            "SELECT * FROM pastes WHERE {} AND created_at > $2
             ORDER BY views + likes * {} DESC, created_at DESC LIMIT $3",
            VISIBLE_POSTGRES, TRENDING_LIKE_WEIGHT
        ))
        .bind(now)
        .bind(cutoff)
        .bind(limit)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query(&format!(
            "SELECT * FROM pastes WHERE {}
             ORDER BY views + likes * {} DESC, created_at DESC LIMIT $2",
            VISIBLE_POSTGRES, TRENDING_LIKE_WEIGHT
        ))
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await?
    };

    Ok(rows.iter().map(map_row_postgres).collect())
}

async fn latest_postgres(pool: &PgPool, limit: i64, now: DateTime<Utc>) -> Result<Vec<Paste>> {
    let rows = sqlx::query(&format!(
        "SELECT * FROM pastes WHERE {} ORDER BY created_at DESC, id DESC LIMIT $2",
        VISIBLE_POSTGRES
    ))
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_row_postgres).collect())
}

async fn add_like_postgres(pool: &PgPool, paste_id: i64, ip_address: &str) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO paste_likes (paste_id, ip_address) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(paste_id)
    .bind(ip_address)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        sqlx::query("UPDATE pastes SET likes = likes + 1 WHERE id = $1")
            .bind(paste_id)
            .execute(pool)
            .await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

async fn remove_like_postgres(pool: &PgPool, paste_id: i64, ip_address: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM paste_likes WHERE paste_id = $1 AND ip_address = $2")
        .bind(paste_id)
        .bind(ip_address)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        sqlx::query("UPDATE pastes SET likes = GREATEST(0, likes - 1) WHERE id = $1")
            .bind(paste_id)
            .execute(pool)
            .await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

async fn statistics_postgres(pool: &PgPool, now: DateTime<Utc>) -> Result<PasteStatistics> {
    // SUM over BIGINT yields NUMERIC in PostgreSQL, so cast back
    let row = sqlx::query(
        r#"SELECT
             COUNT(*) AS total_pastes,
             COALESCE(SUM(views), 0)::BIGINT AS total_views,
             COALESCE(SUM(CASE WHEN expires_at IS NULL OR expires_at > $1 THEN 1 ELSE 0 END), 0)::BIGINT AS active_pastes,
             (SELECT COUNT(*) FROM comments) AS total_comments
           FROM pastes"#,
    )
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(PasteStatistics {
        total_pastes: row.get("total_pastes"),
        active_pastes: row.get("active_pastes"),
        total_views: row.get("total_views"),
        total_comments: row.get("total_comments"),
    })
}
