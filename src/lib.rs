//! inkbin - An anonymous pastebin service
//!
//! This library provides the core functionality for the inkbin paste service.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
