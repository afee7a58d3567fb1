//! Comment repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Comment;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment and bump the paste's comment counter
    async fn create(&self, paste_id: i64, content: &str) -> Result<Comment>;

    /// Get comments for a paste, newest first
    async fn list_by_paste(&self, paste_id: i64) -> Result<Vec<Comment>>;
}

/// Comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, paste_id: i64, content: &str) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), paste_id, content).await
            }
            DatabaseDriver::Postgres => {
                create_postgres(self.pool.as_postgres().unwrap(), paste_id, content).await
            }
        }
    }

    async fn list_by_paste(&self, paste_id: i64) -> Result<Vec<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), paste_id).await
            }
            DatabaseDriver::Postgres => {
                list_postgres(self.pool.as_postgres().unwrap(), paste_id).await
            }
        }
    }
}

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, paste_id: i64, content: &str) -> Result<Comment> {
    let now = Utc::now();
    let result =
        sqlx::query("INSERT INTO comments (paste_id, content, created_at) VALUES (?, ?, ?)")
            .bind(paste_id)
            .bind(content)
            .bind(now)
            .execute(pool)
            .await?;

    sqlx::query("UPDATE pastes SET comments_count = comments_count + 1 WHERE id = ?")
        .bind(paste_id)
        .execute(pool)
        .await?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        paste_id,
        content: content.to_string(),
        created_at: now,
    })
}

async fn list_sqlite(pool: &SqlitePool, paste_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        "SELECT id, paste_id, content, created_at FROM comments
         WHERE paste_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(paste_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Comment {
            id: r.get("id"),
            paste_id: r.get("paste_id"),
            content: r.get("content"),
            created_at: r.get("created_at"),
        })
        .collect())
}

// PostgreSQL implementations

async fn create_postgres(pool: &PgPool, paste_id: i64, content: &str) -> Result<Comment> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO comments (paste_id, content, created_at) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(paste_id)
    .bind(content)
    .bind(now)
    .fetch_one(pool)
    .await?;

    sqlx::query("UPDATE pastes SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(paste_id)
        .execute(pool)
        .await?;

    Ok(Comment {
        id,
        paste_id,
        content: content.to_string(),
        created_at: now,
    })
}

async fn list_postgres(pool: &PgPool, paste_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        "SELECT id, paste_id, content, created_at FROM comments
         WHERE paste_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(paste_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| Comment {
            id: r.get("id"),
            paste_id: r.get("paste_id"),
            content: r.get("content"),
            created_at: r.get("created_at"),
        })
        .collect())
}
