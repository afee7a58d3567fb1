//! Comment API endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::api::middleware::{check_submission_limit, ApiError, AppState};
use crate::models::CreateCommentInput;

/// GET /api/paste/{reference}/comments - Comments on a paste
pub async fn get_comments(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paste = state.paste_service.resolve(&reference).await?;
    let comments = state.comment_service.list(paste.id).await?;
    Ok(Json(comments))
}

/// POST /api/paste/{reference}/comments - Add a comment
pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(reference): Path<String>,
    Json(input): Json<CreateCommentInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_submission_limit(&state, &headers).await?;

    let paste = state.paste_service.resolve(&reference).await?;
    let comment = state.comment_service.create(paste.id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
