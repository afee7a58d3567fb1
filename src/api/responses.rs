//! Shared API response types
//!
//! Common response structures used across multiple API endpoints to keep
//! the wire format consistent.

use serde::{Deserialize, Serialize};

use crate::models::Paste;

/// Paste response with all public fields
#[derive(Debug, Serialize, Deserialize)]
pub struct PasteResponse {
    pub id: i64,
    pub title: Option<String>,
    pub content: String,
    pub syntax: String,
    pub expiration: String,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub views: i64,
    pub likes: i64,
    pub comments_count: i64,
    pub is_private: bool,
    pub short_url: String,
}

impl From<Paste> for PasteResponse {
    fn from(paste: Paste) -> Self {
        Self {
            id: paste.id,
            title: paste.title,
            content: paste.content,
            syntax: paste.syntax.to_string(),
            expiration: paste.expiration.to_string(),
            expires_at: paste.expires_at.map(|dt| dt.to_rfc3339()),
            created_at: paste.created_at.to_rfc3339(),
            views: paste.views,
            likes: paste.likes,
            comments_count: paste.comments_count,
            is_private: paste.is_private,
            short_url: paste.short_url,
        }
    }
}

/// Outcome of a like/unlike request
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub liked: bool,
    pub likes: i64,
}
