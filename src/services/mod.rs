//! Services layer - Business logic
//!
//! This module contains all business logic services for the inkbin paste
//! service. Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories and cache
//! - Handling validation and error cases

pub mod blacklist;
pub mod comment;
pub mod highlight;
pub mod moderation;
pub mod paste;
pub mod rate_limiter;
pub mod webhook;

pub use blacklist::{BlacklistService, Verdict};
pub use comment::{CommentService, CommentServiceError};
pub use highlight::HighlightService;
pub use moderation::{ModerationService, ModerationServiceError};
pub use paste::{generate_short_url, PasteService, PasteServiceError};
pub use rate_limiter::SubmissionRateLimiter;
pub use webhook::{WebhookNotifier, WebhookPayload};
