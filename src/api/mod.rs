//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the inkbin paste
//! service:
//! - Paste endpoints (create, fetch, raw, download, highlighted HTML,
//!   like, listings)
//! - Comment endpoints
//! - Moderation endpoints (abuse reports, support tickets, webhook
//!   interactions)
//! - Service info endpoint

pub mod comments;
pub mod info;
pub mod middleware;
pub mod moderation;
pub mod pastes;
pub mod responses;

#[cfg(test)]
mod tests;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

pub use middleware::{ApiError, AppState, RequestStats};

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/info", get(info::info))
        .route("/trending", get(pastes::trending))
        .route("/latest", get(pastes::latest))
        .route("/paste", post(pastes::create_paste))
        .route("/paste/{reference}", get(pastes::get_paste))
        .route("/paste/{reference}/raw", get(pastes::get_raw))
        .route("/paste/{reference}/download", get(pastes::download))
        .route("/paste/{reference}/html", get(pastes::get_html))
        .route(
            "/paste/{reference}/like",
            post(pastes::like_paste).delete(pastes::unlike_paste),
        )
        .route(
            "/paste/{reference}/comments",
            get(comments::get_comments).post(comments::create_comment),
        )
        .route("/report", post(moderation::report))
        .route("/support", post(moderation::support))
        .route("/webhook/discord", post(moderation::discord_interaction))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", build_api_router())
        .layer(cors)
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
