//! Service info API
//!
//! Public metadata endpoint: version, status, usage statistics and the
//! endpoint catalog.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};
use crate::models::PasteStatistics;

/// Response for the info endpoint
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    pub base_url: String,
    pub statistics: PasteStatistics,
    pub endpoints: Vec<serde_json::Value>,
}

/// GET /api/info - Service information and statistics
pub async fn info(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let statistics = state.paste_service.statistics().await?;

    Ok(Json(InfoResponse {
        name: "inkbin API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        base_url: format!("{}/api", state.base_url),
        statistics,
        endpoints: vec![
            json!({ "path": "/api/trending", "description": "Get trending pastes" }),
            json!({ "path": "/api/latest", "description": "Get latest pastes" }),
            json!({ "path": "/api/paste/{id}", "description": "Get paste by ID or short URL" }),
            json!({ "path": "/api/paste/{id}/raw", "description": "Get raw paste content" }),
            json!({ "path": "/api/paste/{id}/download", "description": "Download paste" }),
            json!({ "path": "/api/paste/{id}/html", "description": "Get highlighted paste HTML" }),
            json!({ "path": "/api/paste/{id}/comments", "description": "Get paste comments" }),
            json!({ "path": "/api/paste/{id}/like", "description": "Like a paste" }),
            json!({ "path": "/api/report", "description": "Report a paste" }),
            json!({ "path": "/api/support", "description": "Submit a support ticket" }),
            json!({ "path": "/api/info", "description": "Get API information and statistics" }),
        ],
    }))
}
