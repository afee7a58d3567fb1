//! inkbin - An anonymous pastebin service

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkbin::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxBlacklistRepository, SqlxCommentRepository, SqlxPasteRepository,
            SqlxReportRepository, SqlxTicketRepository,
        },
    },
    services::{
        BlacklistService, CommentService, HighlightService, ModerationService, PasteService,
        SubmissionRateLimiter, WebhookNotifier,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkbin=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting inkbin paste service...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    // Seed the blacklist from the terms file
    let blacklist_repo = Arc::new(SqlxBlacklistRepository::new(pool.clone()));
    let blacklist_service = Arc::new(BlacklistService::new(blacklist_repo));
    if let Err(e) = blacklist_service.seed_from_file(&config.blacklist.path).await {
        tracing::warn!("Failed to seed blacklist: {:#}", e);
    }

    // Create repositories
    let paste_repo = Arc::new(SqlxPasteRepository::new(pool.clone()));
    let comment_repo = Arc::new(SqlxCommentRepository::new(pool.clone()));
    let report_repo = Arc::new(SqlxReportRepository::new(pool.clone()));
    let ticket_repo = Arc::new(SqlxTicketRepository::new(pool.clone()));

    // Initialize services
    let notifier = Arc::new(WebhookNotifier::new(
        config.webhook.url.clone(),
        config.site.base_url.clone(),
    ));
    if notifier.is_enabled() {
        tracing::info!("Moderation webhook configured");
    } else {
        tracing::info!("Moderation webhook disabled (no URL configured)");
    }

    let paste_service = Arc::new(PasteService::new(
        paste_repo,
        blacklist_service.clone(),
        cache.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo, blacklist_service.clone()));
    let moderation_service = Arc::new(ModerationService::new(report_repo, ticket_repo, notifier));
    let highlight_service = Arc::new(HighlightService::new());
    tracing::info!("Services initialized");

    // Build application state
    let request_stats = Arc::new(RequestStats::new());
    let rate_limiter = Arc::new(SubmissionRateLimiter::new());

    let state = AppState {
        pool: pool.clone(),
        paste_service,
        comment_service,
        moderation_service,
        highlight_service,
        rate_limiter: rate_limiter.clone(),
        request_stats,
        base_url: config.site.base_url.clone(),
    };

    // Start rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
