//! API middleware
//!
//! Contains shared application state, the API error envelope, request
//! statistics and client identification helpers.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::services::{
    CommentService, CommentServiceError, HighlightService, ModerationService,
    ModerationServiceError, PasteService, PasteServiceError, SubmissionRateLimiter,
};

// ============================================================================
// Request Statistics
// ============================================================================

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    /// Total number of requests processed
    total_requests: AtomicU64,
    /// Total response time in microseconds (for calculating average)
    total_response_time_us: AtomicU64,
    /// Application start time
    start_time: Instant,
}

impl RequestStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let total_time = self.total_response_time_us.load(Ordering::Relaxed);
        total_time as f64 / total as f64
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub paste_service: Arc<PasteService>,
    pub comment_service: Arc<CommentService>,
    pub moderation_service: Arc<ModerationService>,
    pub highlight_service: Arc<HighlightService>,
    pub rate_limiter: Arc<SubmissionRateLimiter>,
    pub request_stats: Arc<RequestStats>,
    pub base_url: String,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn content_blocked(message: impl Into<String>) -> Self {
        Self::new("CONTENT_BLOCKED", message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new("RATE_LIMITED", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONTENT_BLOCKED" => StatusCode::FORBIDDEN,
            "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<PasteServiceError> for ApiError {
    fn from(e: PasteServiceError) -> Self {
        match e {
            PasteServiceError::Validation(msg) => ApiError::validation_error(msg),
            PasteServiceError::ContentBlocked(msg) => ApiError::content_blocked(msg),
            PasteServiceError::NotFound => ApiError::not_found("Paste not found"),
            PasteServiceError::Other(e) => {
                tracing::error!("Paste service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::Validation(msg) => ApiError::validation_error(msg),
            CommentServiceError::ContentBlocked(msg) => ApiError::content_blocked(msg),
            CommentServiceError::Other(e) => {
                tracing::error!("Comment service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<ModerationServiceError> for ApiError {
    fn from(e: ModerationServiceError) -> Self {
        match e {
            ModerationServiceError::Validation(msg) => ApiError::validation_error(msg),
            ModerationServiceError::Other(e) => {
                tracing::error!("Moderation service error: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

// ============================================================================
// Client identification
// ============================================================================

/// Extract the client IP from proxy headers
pub fn extract_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

/// Enforce the submission rate limit for a write request.
///
/// Requests without an identifiable IP pass through; everything behind a
/// sane proxy setup carries one.
pub async fn check_submission_limit(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), ApiError> {
    let Some(ip) = extract_ip(headers).and_then(|s| s.parse::<IpAddr>().ok()) else {
        return Ok(());
    };

    if state.rate_limiter.is_limited(ip).await {
        return Err(ApiError::rate_limited(
            "Too many submissions, slow down",
        ));
    }
    state.rate_limiter.record(ip).await;
    Ok(())
}

/// Request statistics middleware
///
/// Records request count and response time for performance monitoring.
/// Uses atomic operations for minimal overhead.
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_us = start.elapsed().as_micros() as u64;
    state.request_stats.record(duration_us);

    response
}
