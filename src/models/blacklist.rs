//! Blacklist entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blocked keyword or regex pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: i64,
    pub pattern: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
