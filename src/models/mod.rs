//! Data models
//!
//! This module contains all data structures used throughout the inkbin
//! paste service. Models represent:
//! - Database entities (Paste, Comment, AbuseReport, SupportTicket, BlacklistEntry, User)
//! - API request/response inputs
//! - Internal data transfer objects

mod blacklist;
mod comment;
mod paste;
mod report;
mod ticket;
mod user;

pub use blacklist::BlacklistEntry;
pub use comment::{Comment, CreateCommentInput};
pub use paste::{
    CreatePasteInput, Expiration, Paste, PasteStatistics, Syntax, TrendingPeriod,
};
pub use report::{AbuseReport, CreateReportInput};
pub use ticket::{CreateTicketInput, SupportTicket};
pub use user::{CreateUserInput, User};
