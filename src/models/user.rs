//! User model
//!
//! Retained from the original schema. The paste surface is anonymous, so
//! nothing routes here; the table and repository exist for schema
//! compatibility with existing deployments.

use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
}

/// Input for creating a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
}
