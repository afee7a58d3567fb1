//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod blacklist;
pub mod comment;
pub mod paste;
pub mod report;
pub mod ticket;
pub mod user;

pub use blacklist::{BlacklistRepository, SqlxBlacklistRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use paste::{PasteRepository, SqlxPasteRepository};
pub use report::{ReportRepository, SqlxReportRepository};
pub use ticket::{SqlxTicketRepository, TicketRepository};
pub use user::{SqlxUserRepository, UserRepository};
