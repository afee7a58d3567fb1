//! Paste API endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{check_submission_limit, extract_ip, ApiError, AppState};
use crate::api::responses::{LikeResponse, PasteResponse};
use crate::models::{CreatePasteInput, TrendingPeriod};
use crate::services::paste::DEFAULT_LIMIT;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub period: Option<String>,
}

/// POST /api/paste - Create a paste
pub async fn create_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreatePasteInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_submission_limit(&state, &headers).await?;

    let paste = state.paste_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(PasteResponse::from(paste))))
}

/// GET /api/paste/{reference} - Get a paste by id or short URL
pub async fn get_paste(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paste = state.paste_service.resolve_and_view(&reference).await?;
    Ok(Json(PasteResponse::from(paste)))
}

/// GET /api/paste/{reference}/raw - Raw paste body
///
/// The Content-Type follows the paste's syntax so browsers render JSON,
/// HTML and friends natively.
pub async fn get_raw(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paste = state.paste_service.resolve_and_view(&reference).await?;

    let content_type = format!("{}; charset=utf-8", paste.syntax.content_type());
    let disposition = format!(
        "inline; filename=\"{}.{}\"",
        paste.id,
        paste.syntax.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        paste.content,
    ))
}

/// GET /api/paste/{reference}/download - Paste body as an attachment
pub async fn download(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paste = state.paste_service.resolve_and_view(&reference).await?;

    let disposition = format!("attachment; filename=\"{}\"", paste.download_filename());

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        paste.content,
    ))
}

/// GET /api/paste/{reference}/html - Syntax-highlighted HTML rendering
pub async fn get_html(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let paste = state.paste_service.resolve_and_view(&reference).await?;

    let html = state
        .highlight_service
        .render(&paste.content, paste.syntax)
        .map_err(|e| {
            tracing::error!("Highlighting failed: {:#}", e);
            ApiError::internal_error("Failed to render paste")
        })?;

    Ok(Html(html))
}

/// POST /api/paste/{reference}/like - Like a paste
///
/// Idempotent per IP: a repeat like succeeds without double-counting.
pub async fn like_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(ip) = extract_ip(&headers) else {
        return Err(ApiError::validation_error("Unable to identify client"));
    };

    let paste = state.paste_service.resolve(&reference).await?;
    let (_counted, likes) = state.paste_service.like(paste.id, &ip).await?;

    Ok(Json(LikeResponse {
        success: true,
        liked: true,
        likes,
    }))
}

/// DELETE /api/paste/{reference}/like - Remove a like
pub async fn unlike_paste(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(ip) = extract_ip(&headers) else {
        return Err(ApiError::validation_error("Unable to identify client"));
    };

    let paste = state.paste_service.resolve(&reference).await?;
    let (_removed, likes) = state.paste_service.unlike(paste.id, &ip).await?;

    Ok(Json(LikeResponse {
        success: true,
        liked: false,
        likes,
    }))
}

/// GET /api/trending - Trending pastes
pub async fn trending(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = match query.period.as_deref() {
        Some(raw) => raw
            .parse::<TrendingPeriod>()
            .map_err(ApiError::validation_error)?,
        None => TrendingPeriod::default(),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let pastes = state.paste_service.trending(limit, period).await?;
    let pastes: Vec<PasteResponse> = pastes.into_iter().map(PasteResponse::from).collect();
    Ok(Json(pastes))
}

/// GET /api/latest - Latest pastes
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let pastes = state.paste_service.latest(limit).await?;
    let pastes: Vec<PasteResponse> = pastes.into_iter().map(PasteResponse::from).collect();
    Ok(Json(pastes))
}
