//! User repository
//!
//! Retained from the original schema; no HTTP surface routes here.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row, SqlitePool};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateUserInput, User};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get a user by id
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// User repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let result =
                    sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
                        .bind(&input.username)
                        .bind(&input.password)
                        .execute(self.pool.as_sqlite().unwrap())
                        .await?;
                Ok(User {
                    id: result.last_insert_rowid(),
                    username: input.username.clone(),
                    password: input.password.clone(),
                })
            }
            DatabaseDriver::Postgres => {
                let id: i64 = sqlx::query_scalar(
                    "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id",
                )
                .bind(&input.username)
                .bind(&input.password)
                .fetch_one(self.pool.as_postgres().unwrap())
                .await?;
                Ok(User {
                    id,
                    username: input.username.clone(),
                    password: input.password.clone(),
                })
            }
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Postgres => {
                get_by_id_postgres(self.pool.as_postgres().unwrap(), id).await
            }
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_username_sqlite(self.pool.as_sqlite().unwrap(), username).await
            }
            DatabaseDriver::Postgres => {
                get_by_username_postgres(self.pool.as_postgres().unwrap(), username).await
            }
        }
    }
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, password FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| User {
        id: r.get("id"),
        username: r.get("username"),
        password: r.get("password"),
    }))
}

async fn get_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, password FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| User {
        id: r.get("id"),
        username: r.get("username"),
        password: r.get("password"),
    }))
}

async fn get_by_id_postgres(pool: &PgPool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, password FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| User {
        id: r.get("id"),
        username: r.get("username"),
        password: r.get("password"),
    }))
}

async fn get_by_username_postgres(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, password FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| User {
        id: r.get("id"),
        username: r.get("username"),
        password: r.get("password"),
    }))
}
