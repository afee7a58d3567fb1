//! Moderation service
//!
//! Abuse reports and support tickets: persist, then relay to the
//! moderation webhook. Webhook delivery never fails the submission.

use std::sync::Arc;

use crate::db::repositories::{ReportRepository, TicketRepository};
use crate::models::{AbuseReport, CreateReportInput, CreateTicketInput, Paste, SupportTicket};
use crate::services::webhook::WebhookNotifier;

/// Moderation service error
#[derive(Debug, thiserror::Error)]
pub enum ModerationServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Moderation service
pub struct ModerationService {
    reports: Arc<dyn ReportRepository>,
    tickets: Arc<dyn TicketRepository>,
    notifier: Arc<WebhookNotifier>,
}

impl ModerationService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        tickets: Arc<dyn TicketRepository>,
        notifier: Arc<WebhookNotifier>,
    ) -> Self {
        Self {
            reports,
            tickets,
            notifier,
        }
    }

    /// File an abuse report against an already-resolved paste
    pub async fn report(
        &self,
        input: CreateReportInput,
        paste: &Paste,
    ) -> Result<AbuseReport, ModerationServiceError> {
        if input.reason.trim().is_empty() {
            return Err(ModerationServiceError::Validation(
                "Reason is required".to_string(),
            ));
        }

        let report = self.reports.create(&input).await?;
        tracing::info!("Abuse report {} filed against paste {}", report.id, paste.id);

        self.notifier.send_abuse_report(&report, paste).await;

        Ok(report)
    }

    /// Submit a support ticket
    pub async fn ticket(
        &self,
        input: CreateTicketInput,
    ) -> Result<SupportTicket, ModerationServiceError> {
        if input.subject.trim().is_empty() {
            return Err(ModerationServiceError::Validation(
                "Subject is required".to_string(),
            ));
        }
        if input.message.trim().is_empty() {
            return Err(ModerationServiceError::Validation(
                "Message is required".to_string(),
            ));
        }

        let ticket = self.tickets.create(&input).await?;
        tracing::info!("Support ticket {} submitted", ticket.id);

        self.notifier.send_support_ticket(&ticket).await;

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        PasteRepository, SqlxPasteRepository, SqlxReportRepository, SqlxTicketRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePasteInput, Expiration, Syntax};

    async fn setup() -> (Paste, ModerationService) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let pastes = SqlxPasteRepository::new(pool.clone());
        let paste = pastes
            .create(
                &CreatePasteInput {
                    title: None,
                    content: "reported paste".to_string(),
                    syntax: Syntax::Plaintext,
                    expiration: Expiration::Never,
                    is_private: false,
                },
                "repo1234",
                None,
            )
            .await
            .unwrap();

        // Empty webhook URL: delivery is a logged no-op
        let notifier = Arc::new(WebhookNotifier::new("", "http://localhost"));
        let service = ModerationService::new(
            Arc::new(SqlxReportRepository::new(pool.clone())),
            Arc::new(SqlxTicketRepository::new(pool.clone())),
            notifier,
        );
        (paste, service)
    }

    #[tokio::test]
    async fn test_report_persisted() {
        let (paste, service) = setup().await;

        let report = service
            .report(
                CreateReportInput {
                    paste_id: paste.id,
                    reason: "phishing page".to_string(),
                },
                &paste,
            )
            .await
            .unwrap();

        assert_eq!(report.paste_id, paste.id);
        assert!(!report.resolved);
    }

    #[tokio::test]
    async fn test_report_requires_reason() {
        let (paste, service) = setup().await;

        let err = service
            .report(
                CreateReportInput {
                    paste_id: paste.id,
                    reason: " ".to_string(),
                },
                &paste,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_ticket_persisted() {
        let (_paste, service) = setup().await;

        let ticket = service
            .ticket(CreateTicketInput {
                email: Some("user@example.com".to_string()),
                subject: "Bug".to_string(),
                message: "Raw view 404s".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(ticket.email.as_deref(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn test_ticket_requires_subject_and_message() {
        let (_paste, service) = setup().await;

        let err = service
            .ticket(CreateTicketInput {
                email: None,
                subject: String::new(),
                message: "body".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationServiceError::Validation(_)));

        let err = service
            .ticket(CreateTicketInput {
                email: None,
                subject: "subject".to_string(),
                message: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationServiceError::Validation(_)));
    }
}
