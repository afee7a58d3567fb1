//! Support ticket model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Support ticket entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: i64,
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

/// Input for submitting a support ticket
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketInput {
    #[serde(default)]
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
}
