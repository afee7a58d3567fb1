//! Moderation API endpoints
//!
//! Abuse reports, support tickets, and the inbound webhook interaction
//! callback used by moderators to remove reported pastes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::api::middleware::{check_submission_limit, ApiError, AppState};
use crate::models::{CreateReportInput, CreateTicketInput};

/// Discord interaction type for button presses
const INTERACTION_BUTTON: u64 = 2;

/// Discord response type for an immediate channel message
const RESPONSE_CHANNEL_MESSAGE: u64 = 4;

/// POST /api/report - Report a paste for abuse
pub async fn report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateReportInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_submission_limit(&state, &headers).await?;

    let paste = state
        .paste_service
        .resolve(&input.paste_id.to_string())
        .await?;

    state.moderation_service.report(input, &paste).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Report submitted successfully" })),
    ))
}

/// POST /api/support - Submit a support ticket
pub async fn support(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateTicketInput>,
) -> Result<impl IntoResponse, ApiError> {
    check_submission_limit(&state, &headers).await?;

    state.moderation_service.ticket(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Support ticket submitted successfully" })),
    ))
}

/// POST /api/webhook/discord - Handle webhook button interactions
///
/// Moderators act on report embeds through buttons whose custom_id is
/// `delete_paste:<id>`. Deleting a paste also blacklists its content.
pub async fn discord_interaction(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let interaction_type = payload.get("type").and_then(|v| v.as_u64());
    let custom_id = payload
        .get("data")
        .and_then(|d| d.get("custom_id"))
        .and_then(|v| v.as_str());

    if interaction_type == Some(INTERACTION_BUTTON) {
        if let Some(id) = custom_id
            .and_then(|c| c.strip_prefix("delete_paste:"))
            .and_then(|raw| raw.parse::<i64>().ok())
        {
            if state.paste_service.delete_and_blacklist(id).await? {
                return Ok(Json(json!({
                    "type": RESPONSE_CHANNEL_MESSAGE,
                    "data": { "content": format!("\u{2705} Paste {} deleted and content blacklisted", id) }
                })));
            }
        }
    }

    Ok(Json(json!({
        "type": RESPONSE_CHANNEL_MESSAGE,
        "data": { "content": "\u{274c} Invalid action" }
    })))
}
