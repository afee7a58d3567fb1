//! Rate limiter for anonymous submissions
//!
//! Protects the write endpoints (pastes, comments, reports, tickets) from
//! flooding by limiting submissions per IP address to 10 per minute.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Submissions allowed per IP within the window
const MAX_SUBMISSIONS: usize = 10;

/// Sliding window length in seconds
const WINDOW_SECS: i64 = 60;

/// Submission rate limiter
pub struct SubmissionRateLimiter {
    /// Submission timestamps by IP address
    attempts: Arc<RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>>,
}

impl SubmissionRateLimiter {
    /// Create a new rate limiter
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check if an IP has exhausted its submission budget
    pub async fn is_limited(&self, ip: IpAddr) -> bool {
        let mut attempts = self.attempts.write().await;
        let cutoff = Utc::now() - Duration::seconds(WINDOW_SECS);

        let ip_attempts = attempts.entry(ip).or_insert_with(Vec::new);
        ip_attempts.retain(|time| *time > cutoff);

        ip_attempts.len() >= MAX_SUBMISSIONS
    }

    /// Record a submission from an IP
    pub async fn record(&self, ip: IpAddr) {
        let mut attempts = self.attempts.write().await;
        attempts.entry(ip).or_insert_with(Vec::new).push(Utc::now());
    }

    /// Clean up stale entries (called periodically from a background task)
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - Duration::seconds(WINDOW_SECS);
        let mut attempts = self.attempts.write().await;
        attempts.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
    }
}

impl Default for SubmissionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_limit_reached_after_max_submissions() {
        let limiter = SubmissionRateLimiter::new();
        let ip = IpAddr::from_str("127.0.0.1").unwrap();

        for _ in 0..MAX_SUBMISSIONS - 1 {
            assert!(!limiter.is_limited(ip).await);
            limiter.record(ip).await;
        }

        limiter.record(ip).await;
        assert!(limiter.is_limited(ip).await);
    }

    #[tokio::test]
    async fn test_ips_are_independent() {
        let limiter = SubmissionRateLimiter::new();
        let a = IpAddr::from_str("10.0.0.1").unwrap();
        let b = IpAddr::from_str("10.0.0.2").unwrap();

        for _ in 0..MAX_SUBMISSIONS {
            limiter.record(a).await;
        }

        assert!(limiter.is_limited(a).await);
        assert!(!limiter.is_limited(b).await);
    }

    #[tokio::test]
    async fn test_cleanup_drops_empty_entries() {
        let limiter = SubmissionRateLimiter::new();
        let ip = IpAddr::from_str("10.0.0.3").unwrap();
        limiter.record(ip).await;

        limiter.cleanup().await;

        // Entry still within the window survives cleanup
        assert!(!limiter.is_limited(ip).await);
        let len = limiter.attempts.read().await.len();
        assert_eq!(len, 1);
    }
}
