//! API endpoint tests
//!
//! Drives the full router against an in-memory SQLite database.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

use crate::api::{build_router, AppState, RequestStats};
use crate::cache::create_cache;
use crate::config::CacheConfig;
use crate::db::repositories::{
    SqlxBlacklistRepository, SqlxCommentRepository, SqlxPasteRepository, SqlxReportRepository,
    SqlxTicketRepository,
};
use crate::db::{create_test_pool, migrations, DynDatabasePool};
use crate::services::{
    BlacklistService, CommentService, HighlightService, ModerationService, PasteService,
    SubmissionRateLimiter, WebhookNotifier,
};

struct TestApp {
    server: TestServer,
    blacklist: Arc<BlacklistService>,
    #[allow(dead_code)]
    pool: DynDatabasePool,
}

async fn spawn_app() -> TestApp {
    let pool = create_test_pool().await.unwrap();
    migrations::run_migrations(&pool).await.unwrap();

    let blacklist = Arc::new(BlacklistService::new(Arc::new(
        SqlxBlacklistRepository::new(pool.clone()),
    )));
    let cache = create_cache(&CacheConfig::default());

    let paste_service = Arc::new(PasteService::new(
        Arc::new(SqlxPasteRepository::new(pool.clone())),
        blacklist.clone(),
        cache,
    ));
    let comment_service = Arc::new(CommentService::new(
        Arc::new(SqlxCommentRepository::new(pool.clone())),
        blacklist.clone(),
    ));
    let moderation_service = Arc::new(ModerationService::new(
        Arc::new(SqlxReportRepository::new(pool.clone())),
        Arc::new(SqlxTicketRepository::new(pool.clone())),
        Arc::new(WebhookNotifier::new("", "http://localhost:8080")),
    ));

    let state = AppState {
        pool: pool.clone(),
        paste_service,
        comment_service,
        moderation_service,
        highlight_service: Arc::new(HighlightService::new()),
        rate_limiter: Arc::new(SubmissionRateLimiter::new()),
        request_stats: Arc::new(RequestStats::new()),
        base_url: "http://localhost:8080".to_string(),
    };

    let router = build_router(state, "http://localhost:3000");
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        blacklist,
        pool,
    }
}

fn forwarded_for(ip: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_str(ip).unwrap(),
    )
}

async fn create_paste(app: &TestApp, content: &str) -> Value {
    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": content }))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()
}

#[tokio::test]
async fn test_create_paste_defaults() {
    let app = spawn_app().await;

    let paste = create_paste(&app, "hello world").await;
    assert_eq!(paste["syntax"], "plaintext");
    assert_eq!(paste["expiration"], "never");
    assert_eq!(paste["views"], 0);
    assert_eq!(paste["short_url"].as_str().unwrap().len(), 8);
    assert!(paste["expires_at"].is_null());
}

#[tokio::test]
async fn test_create_paste_with_options() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({
            "title": "Fib",
            "content": "def fib(n): ...",
            "syntax": "python",
            "expiration": "1h",
            "is_private": true
        }))
        .await;
    assert_eq!(response.status_code(), 201);

    let paste = response.json::<Value>();
    assert_eq!(paste["title"], "Fib");
    assert_eq!(paste["syntax"], "python");
    assert_eq!(paste["expiration"], "1h");
    assert_eq!(paste["is_private"], true);
    assert!(paste["expires_at"].is_string());
}

#[tokio::test]
async fn test_create_paste_empty_content_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": "   " }))
        .await;
    assert_eq!(response.status_code(), 400);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_paste_blacklisted_content_rejected() {
    let app = spawn_app().await;
    app.blacklist.add("forbidden", "test").await.unwrap();

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": "some forbidden words" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "CONTENT_BLOCKED");

    // Nothing was stored
    let info = app.server.get("/api/info").await.json::<Value>();
    assert_eq!(info["statistics"]["total_pastes"], 0);
}

#[tokio::test]
async fn test_get_paste_by_id_and_short_url() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "fetch me").await;

    let by_id = app
        .server
        .get(&format!("/api/paste/{}", paste["id"]))
        .await;
    assert_eq!(by_id.status_code(), 200);

    let by_url = app
        .server
        .get(&format!("/api/paste/{}", paste["short_url"].as_str().unwrap()))
        .await;
    assert_eq!(by_url.status_code(), 200);
    assert_eq!(by_url.json::<Value>()["id"], paste["id"]);
}

#[tokio::test]
async fn test_get_missing_paste_404() {
    let app = spawn_app().await;

    let response = app.server.get("/api/paste/99999").await;
    assert_eq!(response.status_code(), 404);

    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_views_increment_on_fetch() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "count views").await;
    let url = format!("/api/paste/{}", paste["id"]);

    app.server.get(&url).await;
    app.server.get(&url).await;

    let third = app.server.get(&url).await.json::<Value>();
    assert_eq!(third["views"], 2);
}

#[tokio::test]
async fn test_raw_content_type_follows_syntax() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": "{\"a\": 1}", "syntax": "json" }))
        .await;
    let paste = response.json::<Value>();

    let raw = app
        .server
        .get(&format!("/api/paste/{}/raw", paste["id"]))
        .await;
    assert_eq!(raw.status_code(), 200);
    assert_eq!(raw.text(), "{\"a\": 1}");

    let content_type = raw.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("application/json"));

    let disposition = raw
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("inline"));
    assert!(disposition.ends_with(".json\""));
}

#[tokio::test]
async fn test_download_uses_title_filename() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "title": "My Script", "content": "echo hi", "syntax": "shell" }))
        .await;
    let paste = response.json::<Value>();

    let download = app
        .server
        .get(&format!("/api/paste/{}/download", paste["id"]))
        .await;
    assert_eq!(download.status_code(), 200);

    let disposition = download
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(disposition, "attachment; filename=\"my_script.sh\"");
}

#[tokio::test]
async fn test_html_rendering() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": "fn main() {}", "syntax": "rust" }))
        .await;
    let paste = response.json::<Value>();

    let html = app
        .server
        .get(&format!("/api/paste/{}/html", paste["id"]))
        .await;
    assert_eq!(html.status_code(), 200);
    assert!(html.text().contains("<pre"));
}

#[tokio::test]
async fn test_like_twice_same_ip_does_not_double_count() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "likeable").await;
    let url = format!("/api/paste/{}/like", paste["id"]);
    let (name, value) = forwarded_for("1.2.3.4");

    let first = app
        .server
        .post(&url)
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(first.status_code(), 200);
    assert_eq!(first.json::<Value>()["likes"], 1);

    let second = app.server.post(&url).add_header(name, value).await;
    assert_eq!(second.status_code(), 200);
    assert_eq!(second.json::<Value>()["likes"], 1);

    // A different IP still counts
    let (name, value) = forwarded_for("5.6.7.8");
    let third = app.server.post(&url).add_header(name, value).await;
    assert_eq!(third.json::<Value>()["likes"], 2);
}

#[tokio::test]
async fn test_unlike_decrements() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "fickle crowd").await;
    let url = format!("/api/paste/{}/like", paste["id"]);
    let (name, value) = forwarded_for("1.2.3.4");

    app.server
        .post(&url)
        .add_header(name.clone(), value.clone())
        .await;
    let unliked = app.server.delete(&url).add_header(name, value).await;

    assert_eq!(unliked.status_code(), 200);
    assert_eq!(unliked.json::<Value>()["likes"], 0);
}

#[tokio::test]
async fn test_like_without_client_ip_rejected() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "anonymous like").await;

    let response = app
        .server
        .post(&format!("/api/paste/{}/like", paste["id"]))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_comments_roundtrip() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "discuss").await;
    let url = format!("/api/paste/{}/comments", paste["id"]);

    let created = app
        .server
        .post(&url)
        .json(&json!({ "content": "great paste" }))
        .await;
    assert_eq!(created.status_code(), 201);

    let comments = app.server.get(&url).await.json::<Value>();
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["content"], "great paste");

    // Counter reflected on the paste
    let fetched = app
        .server
        .get(&format!("/api/paste/{}", paste["id"]))
        .await
        .json::<Value>();
    assert_eq!(fetched["comments_count"], 1);
}

#[tokio::test]
async fn test_comment_on_missing_paste_404() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste/12345/comments")
        .json(&json!({ "content": "hello?" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_blacklisted_comment_rejected() {
    let app = spawn_app().await;
    app.blacklist.add("banned", "test").await.unwrap();
    let paste = create_paste(&app, "clean paste").await;

    let response = app
        .server
        .post(&format!("/api/paste/{}/comments", paste["id"]))
        .json(&json!({ "content": "this is banned content" }))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_report_roundtrip() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "reported").await;

    let response = app
        .server
        .post("/api/report")
        .json(&json!({ "paste_id": paste["id"], "reason": "spam" }))
        .await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_report_missing_paste_404() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/report")
        .json(&json!({ "paste_id": 404404, "reason": "spam" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_support_ticket() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/support")
        .json(&json!({ "subject": "Help", "message": "Where did my paste go?" }))
        .await;
    assert_eq!(response.status_code(), 201);

    let missing_subject = app
        .server
        .post("/api/support")
        .json(&json!({ "subject": "", "message": "..." }))
        .await;
    assert_eq!(missing_subject.status_code(), 400);
}

#[tokio::test]
async fn test_trending_and_latest_listings() {
    let app = spawn_app().await;
    create_paste(&app, "one").await;
    create_paste(&app, "two").await;

    let latest = app.server.get("/api/latest").await;
    assert_eq!(latest.status_code(), 200);
    let latest = latest.json::<Value>();
    assert_eq!(latest.as_array().unwrap().len(), 2);
    // Newest first
    assert_eq!(latest[0]["content"], "two");

    let trending = app.server.get("/api/trending?period=week&limit=1").await;
    assert_eq!(trending.status_code(), 200);
    assert_eq!(trending.json::<Value>().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_trending_invalid_period_rejected() {
    let app = spawn_app().await;

    let response = app.server.get("/api/trending?period=fortnight").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_private_paste_hidden_from_listings() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": "secret", "is_private": true }))
        .await;
    let paste = response.json::<Value>();

    let latest = app.server.get("/api/latest").await.json::<Value>();
    assert!(latest.as_array().unwrap().is_empty());

    // Still reachable directly
    let direct = app
        .server
        .get(&format!("/api/paste/{}", paste["short_url"].as_str().unwrap()))
        .await;
    assert_eq!(direct.status_code(), 200);
}

#[tokio::test]
async fn test_info_endpoint() {
    let app = spawn_app().await;
    create_paste(&app, "counted").await;

    let info = app.server.get("/api/info").await;
    assert_eq!(info.status_code(), 200);

    let info = info.json::<Value>();
    assert_eq!(info["name"], "inkbin API");
    assert_eq!(info["status"], "operational");
    assert_eq!(info["statistics"]["total_pastes"], 1);
    assert!(info["endpoints"].as_array().unwrap().len() >= 10);
}

#[tokio::test]
async fn test_webhook_delete_interaction() {
    let app = spawn_app().await;
    let paste = create_paste(&app, "offensive content").await;

    let response = app
        .server
        .post("/api/webhook/discord")
        .json(&json!({
            "type": 2,
            "data": { "custom_id": format!("delete_paste:{}", paste["id"]) }
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["type"], 4);
    assert!(body["data"]["content"]
        .as_str()
        .unwrap()
        .contains("deleted"));

    // The paste is gone and its content blocked
    let gone = app
        .server
        .get(&format!("/api/paste/{}", paste["id"]))
        .await;
    assert_eq!(gone.status_code(), 404);

    let resubmit = app
        .server
        .post("/api/paste")
        .json(&json!({ "content": "offensive content" }))
        .await;
    assert_eq!(resubmit.status_code(), 403);
}

#[tokio::test]
async fn test_webhook_invalid_interaction() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/webhook/discord")
        .json(&json!({ "type": 1 }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response.json::<Value>()["data"]["content"]
        .as_str()
        .unwrap()
        .contains("Invalid action"));
}

#[tokio::test]
async fn test_submission_rate_limit() {
    let app = spawn_app().await;
    let (name, value) = forwarded_for("9.9.9.9");

    for i in 0..10 {
        let response = app
            .server
            .post("/api/paste")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "content": format!("paste number {}", i) }))
            .await;
        assert_eq!(response.status_code(), 201);
    }

    let eleventh = app
        .server
        .post("/api/paste")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "content": "one too many" }))
        .await;
    assert_eq!(eleventh.status_code(), 429);

    // Other IPs are unaffected
    let (name, value) = forwarded_for("8.8.8.8");
    let other = app
        .server
        .post("/api/paste")
        .add_header(name, value)
        .json(&json!({ "content": "different client" }))
        .await;
    assert_eq!(other.status_code(), 201);
}
