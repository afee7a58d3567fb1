//! Support ticket repository

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateTicketInput, SupportTicket};

/// Support ticket repository trait
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Record a support ticket
    async fn create(&self, input: &CreateTicketInput) -> Result<SupportTicket>;
}

/// Support ticket repository implementation
pub struct SqlxTicketRepository {
    pool: DynDatabasePool,
}

impl SqlxTicketRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqlxTicketRepository {
    async fn create(&self, input: &CreateTicketInput) -> Result<SupportTicket> {
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

async fn create_sqlite(pool: &SqlitePool, input: &CreateTicketInput) -> Result<SupportTicket> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO support_tickets (email, subject, message, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.email)
    .bind(&input.subject)
    .bind(&input.message)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(SupportTicket {
        id: result.last_insert_rowid(),
        email: input.email.clone(),
        subject: input.subject.clone(),
        message: input.message.clone(),
        created_at: now,
        resolved: false,
    })
}

async fn create_postgres(pool: &PgPool, input: &CreateTicketInput) -> Result<SupportTicket> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO support_tickets (email, subject, message, created_at)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&input.email)
    .bind(&input.subject)
    .bind(&input.message)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(SupportTicket {
        id,
        email: input.email.clone(),
        subject: input.subject.clone(),
        message: input.message.clone(),
        created_at: now,
        resolved: false,
    })
}
