//! Paste service
//!
//! Business rules for the paste lifecycle: validation, blacklist
//! screening, short URL allocation, lazy expiration, listings and
//! moderation removal.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;

use crate::cache::{Cache, CacheLayer};
use crate::db::repositories::PasteRepository;
use crate::models::{CreatePasteInput, Paste, PasteStatistics, TrendingPeriod};
use crate::services::blacklist::BlacklistService;

/// Largest accepted paste body
const MAX_CONTENT_BYTES: usize = 512 * 1024;

/// Longest accepted title
const MAX_TITLE_CHARS: usize = 200;

/// Default listing size
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest listing size a client may request
pub const MAX_LIMIT: i64 = 100;

/// Short URL length
const SHORT_URL_LEN: usize = 8;

/// Attempts to find an unused short URL before giving up
const SHORT_URL_RETRIES: usize = 5;

const SHORT_URL_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Listing cache TTL
const LIST_CACHE_TTL_SECS: u64 = 60;

const CACHE_KEY_TRENDING: &str = "pastes:trending";
const CACHE_KEY_LATEST: &str = "pastes:latest";

/// Paste service error
#[derive(Debug, thiserror::Error)]
pub enum PasteServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    ContentBlocked(String),
    #[error("Paste not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Paste service
pub struct PasteService {
    repo: Arc<dyn PasteRepository>,
    blacklist: Arc<BlacklistService>,
    cache: Arc<Cache>,
}

impl PasteService {
    pub fn new(
        repo: Arc<dyn PasteRepository>,
        blacklist: Arc<BlacklistService>,
        cache: Arc<Cache>,
    ) -> Self {
        Self {
            repo,
            blacklist,
            cache,
        }
    }

    /// Create a paste.
    ///
    /// Validates the input, screens the content against the blacklist,
    /// fixes the expiry timestamp at creation time and allocates a unique
    /// short URL.
    pub async fn create(&self, input: CreatePasteInput) -> Result<Paste, PasteServiceError> {
        if input.content.trim().is_empty() {
            return Err(PasteServiceError::Validation(
                "Content is required".to_string(),
            ));
        }
        if input.content.len() > MAX_CONTENT_BYTES {
            return Err(PasteServiceError::Validation(format!(
                "Content exceeds the maximum size of {} bytes",
                MAX_CONTENT_BYTES
            )));
        }
        if let Some(title) = &input.title {
            if title.chars().count() > MAX_TITLE_CHARS {
                return Err(PasteServiceError::Validation(format!(
                    "Title exceeds the maximum length of {} characters",
                    MAX_TITLE_CHARS
                )));
            }
        }

        let verdict = self.blacklist.check(&input.content).await?;
        if verdict.blocked {
            return Err(PasteServiceError::ContentBlocked(verdict.reason));
        }

        let expires_at = input.expiration.expires_at(Utc::now());

        for _ in 0..SHORT_URL_RETRIES {
            let short_url = generate_short_url();
            if self.repo.get_by_short_url(&short_url).await?.is_some() {
                tracing::debug!("Short URL collision, retrying: {}", short_url);
                continue;
            }

            let paste = self.repo.create(&input, &short_url, expires_at).await?;
            self.invalidate_listings().await;
            tracing::info!("Created paste {} ({})", paste.id, paste.short_url);
            return Ok(paste);
        }

        Err(PasteServiceError::Other(anyhow::anyhow!(
            "Failed to allocate a unique short URL"
        )))
    }

    /// Resolve a paste by numeric id or short URL.
    ///
    /// Expired pastes are deleted on sight and reported as not found.
    pub async fn resolve(&self, reference: &str) -> Result<Paste, PasteServiceError> {
        let paste = match reference.parse::<i64>() {
            Ok(id) => self.repo.get_by_id(id).await?,
            Err(_) => self.repo.get_by_short_url(reference).await?,
        };

        let paste = paste.ok_or(PasteServiceError::NotFound)?;

        if paste.is_expired(Utc::now()) {
            tracing::debug!("Deleting expired paste {}", paste.id);
            self.repo.delete(paste.id).await?;
            self.invalidate_listings().await;
            return Err(PasteServiceError::NotFound);
        }

        Ok(paste)
    }

    /// Resolve a paste and count the read as a view
    pub async fn resolve_and_view(&self, reference: &str) -> Result<Paste, PasteServiceError> {
        let paste = self.resolve(reference).await?;
        self.repo.increment_views(paste.id).await?;
        Ok(paste)
    }

    /// Like a paste from an IP. Returns whether the like was newly counted
    /// and the resulting like count; a repeat like from the same IP is a
    /// successful no-op.
    pub async fn like(&self, paste_id: i64, ip: &str) -> Result<(bool, i64), PasteServiceError> {
        let counted = self.repo.add_like(paste_id, ip).await?;
        let likes = self
            .repo
            .get_by_id(paste_id)
            .await?
            .map(|p| p.likes)
            .unwrap_or(0);
        Ok((counted, likes))
    }

    /// Remove an IP's like from a paste
    pub async fn unlike(&self, paste_id: i64, ip: &str) -> Result<(bool, i64), PasteServiceError> {
        let removed = self.repo.remove_like(paste_id, ip).await?;
        let likes = self
            .repo
            .get_by_id(paste_id)
            .await?
            .map(|p| p.likes)
            .unwrap_or(0);
        Ok((removed, likes))
    }

    /// Trending pastes within a period, ranked by weighted views+likes
    pub async fn trending(
        &self,
        limit: i64,
        period: TrendingPeriod,
    ) -> Result<Vec<Paste>, PasteServiceError> {
        let limit = clamp_limit(limit);
        let cache_key = format!("{}:{}:{}", CACHE_KEY_TRENDING, period, limit);

        if let Ok(Some(cached)) = self.cache.get::<Vec<Paste>>(&cache_key).await {
            return Ok(cached);
        }

        let now = Utc::now();
        let pastes = self.repo.trending(limit, period.cutoff(now), now).await?;

        let _ = self
            .cache
            .set(&cache_key, &pastes, StdDuration::from_secs(LIST_CACHE_TTL_SECS))
            .await;

        Ok(pastes)
    }

    /// Latest public pastes
    pub async fn latest(&self, limit: i64) -> Result<Vec<Paste>, PasteServiceError> {
        let limit = clamp_limit(limit);
        let cache_key = format!("{}:{}", CACHE_KEY_LATEST, limit);

        if let Ok(Some(cached)) = self.cache.get::<Vec<Paste>>(&cache_key).await {
            return Ok(cached);
        }

        let pastes = self.repo.latest(limit, Utc::now()).await?;

        let _ = self
            .cache
            .set(&cache_key, &pastes, StdDuration::from_secs(LIST_CACHE_TTL_SECS))
            .await;

        Ok(pastes)
    }

    /// Moderation removal: delete the paste and blacklist its content so
    /// it cannot be resubmitted.
    pub async fn delete_and_blacklist(&self, id: i64) -> Result<bool, PasteServiceError> {
        let Some(paste) = self.repo.get_by_id(id).await? else {
            return Ok(false);
        };

        self.repo.delete(id).await?;
        self.blacklist
            .add(&paste.content, "Removed by moderator")
            .await?;
        self.invalidate_listings().await;
        tracing::info!("Paste {} deleted and content blacklisted", id);

        Ok(true)
    }

    /// Aggregate counters for the info endpoint
    pub async fn statistics(&self) -> Result<PasteStatistics, PasteServiceError> {
        Ok(self.repo.statistics(Utc::now()).await?)
    }

    async fn invalidate_listings(&self) {
        let _ = self.cache.delete_pattern("pastes:*").await;
    }
}

fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIMIT)
}

/// Generate a random short URL from the 62-character alphabet
pub fn generate_short_url() -> String {
    uuid::Uuid::new_v4()
        .into_bytes()
        .iter()
        .take(SHORT_URL_LEN)
        .map(|b| SHORT_URL_ALPHABET[(*b as usize) % SHORT_URL_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::db::repositories::{SqlxBlacklistRepository, SqlxPasteRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Expiration, Syntax};

    async fn setup_with_pool() -> (crate::db::DynDatabasePool, PasteService) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let repo = Arc::new(SqlxPasteRepository::new(pool.clone()));
        let blacklist = Arc::new(BlacklistService::new(Arc::new(
            SqlxBlacklistRepository::new(pool.clone()),
        )));
        let cache = crate::cache::create_cache(&CacheConfig::default());
        (pool.clone(), PasteService::new(repo, blacklist, cache))
    }

    async fn setup() -> PasteService {
        setup_with_pool().await.1
    }

    fn input(content: &str) -> CreatePasteInput {
        CreatePasteInput {
            title: None,
            content: content.to_string(),
            syntax: Syntax::Plaintext,
            expiration: Expiration::Never,
            is_private: false,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_short_url() {
        let service = setup().await;
        let paste = service.create(input("hello")).await.unwrap();

        assert_eq!(paste.short_url.len(), 8);
        assert!(paste
            .short_url
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
        assert!(paste.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let service = setup().await;
        let err = service.create(input("   ")).await.unwrap_err();
        assert!(matches!(err, PasteServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_content() {
        let service = setup().await;
        let err = service
            .create(input(&"x".repeat(MAX_CONTENT_BYTES + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, PasteServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let service = setup().await;
        let mut i = input("fine");
        i.title = Some("t".repeat(MAX_TITLE_CHARS + 1));
        let err = service.create(i).await.unwrap_err();
        assert!(matches!(err, PasteServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_blocked_by_blacklist() {
        let service = setup().await;
        service.blacklist.add("forbidden", "test").await.unwrap();

        let err = service.create(input("very forbidden text")).await.unwrap_err();
        assert!(matches!(err, PasteServiceError::ContentBlocked(_)));

        // Nothing was inserted
        let stats = service.statistics().await.unwrap();
        assert_eq!(stats.total_pastes, 0);
    }

    #[tokio::test]
    async fn test_create_sets_expiry() {
        let service = setup().await;
        let mut i = input("short lived");
        i.expiration = Expiration::TenMinutes;

        let before = Utc::now();
        let paste = service.create(i).await.unwrap();
        let expires_at = paste.expires_at.unwrap();

        let lower = before + chrono::Duration::minutes(9);
        let upper = before + chrono::Duration::minutes(11);
        assert!(expires_at > lower && expires_at < upper);
    }

    #[tokio::test]
    async fn test_resolve_by_id_and_short_url() {
        let service = setup().await;
        let paste = service.create(input("find me")).await.unwrap();

        let by_id = service.resolve(&paste.id.to_string()).await.unwrap();
        assert_eq!(by_id.id, paste.id);

        let by_url = service.resolve(&paste.short_url).await.unwrap();
        assert_eq!(by_url.id, paste.id);

        let err = service.resolve("zzzz9999").await.unwrap_err();
        assert!(matches!(err, PasteServiceError::NotFound));
    }

    #[tokio::test]
    async fn test_expired_paste_is_deleted_on_read() {
        let (pool, service) = setup_with_pool().await;
        let mut i = input("gone soon");
        i.expiration = Expiration::TenMinutes;
        let paste = service.create(i).await.unwrap();

        // Force the expiry into the past
        sqlx::query("UPDATE pastes SET expires_at = ? WHERE id = ?")
            .bind(Utc::now() - chrono::Duration::minutes(1))
            .bind(paste.id)
            .execute(pool.as_sqlite().unwrap())
            .await
            .unwrap();

        let err = service.resolve(&paste.short_url).await.unwrap_err();
        assert!(matches!(err, PasteServiceError::NotFound));

        // The row was removed, not just filtered
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pastes")
            .fetch_one(pool.as_sqlite().unwrap())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_resolve_and_view_increments() {
        let service = setup().await;
        let paste = service.create(input("watch me")).await.unwrap();

        service.resolve_and_view(&paste.short_url).await.unwrap();
        let fetched = service.resolve(&paste.short_url).await.unwrap();
        assert_eq!(fetched.views, 1);
    }

    #[tokio::test]
    async fn test_like_twice_does_not_double_count() {
        let service = setup().await;
        let paste = service.create(input("likeable")).await.unwrap();

        let (counted, likes) = service.like(paste.id, "1.2.3.4").await.unwrap();
        assert!(counted);
        assert_eq!(likes, 1);

        let (counted, likes) = service.like(paste.id, "1.2.3.4").await.unwrap();
        assert!(!counted);
        assert_eq!(likes, 1);

        let (removed, likes) = service.unlike(paste.id, "1.2.3.4").await.unwrap();
        assert!(removed);
        assert_eq!(likes, 0);
    }

    #[tokio::test]
    async fn test_listings_clamp_limit() {
        let service = setup().await;
        for i in 0..3 {
            service.create(input(&format!("paste {}", i))).await.unwrap();
        }

        let latest = service.latest(0).await.unwrap();
        assert_eq!(latest.len(), 1);

        let latest = service.latest(1000).await.unwrap();
        assert_eq!(latest.len(), 3);
    }

    #[tokio::test]
    async fn test_trending_cache_invalidated_on_create() {
        let service = setup().await;
        service.create(input("first")).await.unwrap();

        let trending = service.trending(10, TrendingPeriod::Week).await.unwrap();
        assert_eq!(trending.len(), 1);

        // A new paste must show up despite the cached listing
        service.create(input("second")).await.unwrap();
        let trending = service.trending(10, TrendingPeriod::Week).await.unwrap();
        assert_eq!(trending.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_blacklist_blocks_resubmission() {
        let service = setup().await;
        let paste = service.create(input("bad stuff here")).await.unwrap();

        assert!(service.delete_and_blacklist(paste.id).await.unwrap());
        assert!(!service.delete_and_blacklist(paste.id).await.unwrap());

        let err = service.resolve(&paste.short_url).await.unwrap_err();
        assert!(matches!(err, PasteServiceError::NotFound));

        // The removed content can no longer be pasted
        let err = service.create(input("bad stuff here")).await.unwrap_err();
        assert!(matches!(err, PasteServiceError::ContentBlocked(_)));
    }

    #[test]
    fn test_generate_short_url_alphabet() {
        for _ in 0..100 {
            let url = generate_short_url();
            assert_eq!(url.len(), 8);
            assert!(url.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
