//! Abuse report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Abuse report entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbuseReport {
    pub id: i64,
    pub paste_id: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

/// Input for reporting a paste
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportInput {
    pub paste_id: i64,
    pub reason: String,
}
