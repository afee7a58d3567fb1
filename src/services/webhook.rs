//! Moderation webhook delivery
//!
//! Abuse reports and support tickets are relayed to a Discord-compatible
//! webhook as embed payloads. Delivery is fire-and-forget: failures are
//! logged and never surfaced to the submitting client.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{AbuseReport, Paste, SupportTicket};

/// Embed color for abuse reports (red)
const COLOR_ABUSE: u32 = 16711680;

/// Embed color for support tickets (blue)
const COLOR_SUPPORT: u32 = 3447003;

/// Longest content preview included in a report embed
const PREVIEW_LIMIT: usize = 500;

/// Discord webhook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

/// A single embed block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A name/value pair inside an embed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
}

/// Webhook client for moderation notifications
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    base_url: String,
}

impl WebhookNotifier {
    /// Create a notifier. An empty URL disables delivery.
    pub fn new(url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            base_url: base_url.into(),
        }
    }

    /// Whether a webhook URL is configured
    pub fn is_enabled(&self) -> bool {
        !self.url.is_empty()
    }

    /// Send a payload to the webhook. Errors are logged, not returned.
    pub async fn send(&self, payload: &WebhookPayload) {
        if !self.is_enabled() {
            tracing::debug!("Webhook delivery skipped: no URL configured");
            return;
        }

        match self.client.post(&self.url).json(payload).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::error!(
                    "Webhook delivery failed with status {}",
                    response.status()
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Webhook delivery failed: {}", e);
            }
        }
    }

    /// Relay an abuse report
    pub async fn send_abuse_report(&self, report: &AbuseReport, paste: &Paste) {
        self.send(&abuse_report_payload(report, paste, &self.base_url))
            .await;
    }

    /// Relay a support ticket
    pub async fn send_support_ticket(&self, ticket: &SupportTicket) {
        self.send(&support_ticket_payload(ticket)).await;
    }
}

/// Build the embed payload for an abuse report
pub fn abuse_report_payload(report: &AbuseReport, paste: &Paste, base_url: &str) -> WebhookPayload {
    WebhookPayload {
        content: None,
        embeds: vec![Embed {
            title: "\u{26a0}\u{fe0f} Abuse Report".to_string(),
            description: Some(format!("{}/paste/{}", base_url, paste.id)),
            color: Some(COLOR_ABUSE),
            fields: vec![
                EmbedField {
                    name: "Paste ID".to_string(),
                    value: format!("{} ({})", paste.id, paste.short_url),
                    inline: Some(true),
                },
                EmbedField {
                    name: "Title".to_string(),
                    value: paste
                        .title
                        .clone()
                        .unwrap_or_else(|| "Untitled".to_string()),
                    inline: Some(true),
                },
                EmbedField {
                    name: "Syntax".to_string(),
                    value: paste.syntax.to_string(),
                    inline: Some(true),
                },
                EmbedField {
                    name: "Reason".to_string(),
                    value: report.reason.clone(),
                    inline: None,
                },
                EmbedField {
                    name: "Content Preview".to_string(),
                    value: preview(&paste.content),
                    inline: None,
                },
            ],
            timestamp: Some(Utc::now().to_rfc3339()),
        }],
    }
}

/// Build the embed payload for a support ticket
pub fn support_ticket_payload(ticket: &SupportTicket) -> WebhookPayload {
    WebhookPayload {
        content: None,
        embeds: vec![Embed {
            title: "\u{1f3ab} Support Ticket".to_string(),
            description: None,
            color: Some(COLOR_SUPPORT),
            fields: vec![
                EmbedField {
                    name: "Subject".to_string(),
                    value: ticket.subject.clone(),
                    inline: None,
                },
                EmbedField {
                    name: "Email".to_string(),
                    value: ticket
                        .email
                        .clone()
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    inline: Some(true),
                },
                EmbedField {
                    name: "Message".to_string(),
                    value: ticket.message.clone(),
                    inline: None,
                },
            ],
            timestamp: Some(Utc::now().to_rfc3339()),
        }],
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_LIMIT {
        let truncated: String = content.chars().take(PREVIEW_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}
