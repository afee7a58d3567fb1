//! Database layer
//!
//! This module provides database abstraction for the inkbin paste service.
//! It supports:
//! - SQLite (default, for single-binary deployment)
//! - PostgreSQL (for larger deployments)
//!
//! The database driver is selected based on configuration.
//!
//! # Architecture
//!
//! The database layer uses a trait-based abstraction (`DatabasePool`) that
//! allows the application to work with either SQLite or PostgreSQL without
//! knowing the specific backend.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, PostgresDatabase,
    SqliteDatabase,
};
