//! Abuse report repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{AbuseReport, CreateReportInput};

/// Abuse report repository trait
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Record an abuse report against a paste
    async fn create(&self, input: &CreateReportInput) -> Result<AbuseReport>;
}

/// Abuse report repository implementation
pub struct SqlxReportRepository {
    pool: DynDatabasePool,
}

impl SqlxReportRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for SqlxReportRepository {
    async fn create(&self, input: &CreateReportInput) -> Result<AbuseReport> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_sqlite(self.pool.as_sqlite().unwrap(), input).await
            }
            DatabaseDriver::Postgres => {
                create_postgres(self.pool.as_postgres().unwrap(), input).await
            }
        }
    }
}

async fn create_sqlite(pool: &SqlitePool, input: &CreateReportInput) -> Result<AbuseReport> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO abuse_reports (paste_id, reason, created_at) VALUES (?, ?, ?)",
    )
    .bind(input.paste_id)
    .bind(&input.reason)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(AbuseReport {
        id: result.last_insert_rowid(),
        paste_id: input.paste_id,
        reason: input.reason.clone(),
        created_at: now,
        resolved: false,
    })
}

async fn create_postgres(pool: &PgPool, input: &CreateReportInput) -> Result<AbuseReport> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO abuse_reports (paste_id, reason, created_at) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(input.paste_id)
    .bind(&input.reason)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(AbuseReport {
        id,
        paste_id: input.paste_id,
        reason: input.reason.clone(),
        created_at: now,
        resolved: false,
    })
}
