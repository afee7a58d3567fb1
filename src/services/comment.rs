//! Comment service

use std::sync::Arc;

use crate::db::repositories::CommentRepository;
use crate::models::{Comment, CreateCommentInput};
use crate::services::blacklist::BlacklistService;

/// Largest accepted comment body
const MAX_COMMENT_BYTES: usize = 10 * 1024;

/// Comment service error
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ContentBlocked(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    blacklist: Arc<BlacklistService>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>, blacklist: Arc<BlacklistService>) -> Self {
        Self { repo, blacklist }
    }

    /// Create a comment on a paste.
    ///
    /// The caller is responsible for having resolved the paste; this
    /// validates and screens the comment body only.
    pub async fn create(
        &self,
        paste_id: i64,
        input: CreateCommentInput,
    ) -> Result<Comment, CommentServiceError> {
        if input.content.trim().is_empty() {
            return Err(CommentServiceError::Validation(
                "Content is required".to_string(),
            ));
        }
        if input.content.len() > MAX_COMMENT_BYTES {
            return Err(CommentServiceError::Validation(format!(
                "Comment exceeds the maximum size of {} bytes",
                MAX_COMMENT_BYTES
            )));
        }

        let verdict = self.blacklist.check(&input.content).await?;
        if verdict.blocked {
            return Err(CommentServiceError::ContentBlocked(verdict.reason));
        }

        Ok(self.repo.create(paste_id, &input.content).await?)
    }

    /// Comments on a paste, newest first
    pub async fn list(&self, paste_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        Ok(self.repo.list_by_paste(paste_id).await?)
    }
}
