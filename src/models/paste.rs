//! Paste model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Syntax highlighting language of a paste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Plaintext,
    Javascript,
    Typescript,
    Python,
    Java,
    Csharp,
    Html,
    Css,
    Php,
    Ruby,
    Go,
    Rust,
    C,
    Cpp,
    Shell,
    Sql,
    Json,
    Yaml,
    Markdown,
    Xml,
}

impl Syntax {
    /// All supported syntaxes, in enum order
    pub const ALL: &'static [Syntax] = &[
        Syntax::Plaintext,
        Syntax::Javascript,
        Syntax::Typescript,
        Syntax::Python,
        Syntax::Java,
        Syntax::Csharp,
        Syntax::Html,
        Syntax::Css,
        Syntax::Php,
        Syntax::Ruby,
        Syntax::Go,
        Syntax::Rust,
        Syntax::C,
        Syntax::Cpp,
        Syntax::Shell,
        Syntax::Sql,
        Syntax::Json,
        Syntax::Yaml,
        Syntax::Markdown,
        Syntax::Xml,
    ];

    /// File extension used for raw/download filenames
    pub fn extension(&self) -> &'static str {
        match self {
            Syntax::Plaintext => "txt",
            Syntax::Javascript => "js",
            Syntax::Typescript => "ts",
            Syntax::Python => "py",
            Syntax::Java => "java",
            Syntax::Csharp => "cs",
            Syntax::Html => "html",
            Syntax::Css => "css",
            Syntax::Php => "php",
            Syntax::Ruby => "rb",
            Syntax::Go => "go",
            Syntax::Rust => "rs",
            Syntax::C => "c",
            Syntax::Cpp => "cpp",
            Syntax::Shell => "sh",
            Syntax::Sql => "sql",
            Syntax::Json => "json",
            Syntax::Yaml => "yml",
            Syntax::Markdown => "md",
            Syntax::Xml => "xml",
        }
    }

    /// Content-Type served by the raw endpoint
    pub fn content_type(&self) -> &'static str {
        match self {
            Syntax::Javascript => "application/javascript",
            Syntax::Typescript => "application/typescript",
            Syntax::Json => "application/json",
            Syntax::Html => "text/html",
            Syntax::Css => "text/css",
            Syntax::Xml => "application/xml",
            Syntax::Markdown => "text/markdown",
            _ => "text/plain",
        }
    }
}

impl std::fmt::Display for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Syntax::Plaintext => "plaintext",
            Syntax::Javascript => "javascript",
            Syntax::Typescript => "typescript",
            Syntax::Python => "python",
            Syntax::Java => "java",
            Syntax::Csharp => "csharp",
            Syntax::Html => "html",
            Syntax::Css => "css",
            Syntax::Php => "php",
            Syntax::Ruby => "ruby",
            Syntax::Go => "go",
            Syntax::Rust => "rust",
            Syntax::C => "c",
            Syntax::Cpp => "cpp",
            Syntax::Shell => "shell",
            Syntax::Sql => "sql",
            Syntax::Json => "json",
            Syntax::Yaml => "yaml",
            Syntax::Markdown => "markdown",
            Syntax::Xml => "xml",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plaintext" => Ok(Syntax::Plaintext),
            "javascript" => Ok(Syntax::Javascript),
            "typescript" => Ok(Syntax::Typescript),
            "python" => Ok(Syntax::Python),
            "java" => Ok(Syntax::Java),
            "csharp" => Ok(Syntax::Csharp),
            "html" => Ok(Syntax::Html),
            "css" => Ok(Syntax::Css),
            "php" => Ok(Syntax::Php),
            "ruby" => Ok(Syntax::Ruby),
            "go" => Ok(Syntax::Go),
            "rust" => Ok(Syntax::Rust),
            "c" => Ok(Syntax::C),
            "cpp" => Ok(Syntax::Cpp),
            "shell" => Ok(Syntax::Shell),
            "sql" => Ok(Syntax::Sql),
            "json" => Ok(Syntax::Json),
            "yaml" => Ok(Syntax::Yaml),
            "markdown" => Ok(Syntax::Markdown),
            "xml" => Ok(Syntax::Xml),
            _ => Err(format!("Unknown syntax: {}", s)),
        }
    }
}

/// Paste expiration setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Expiration {
    #[default]
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
}

impl Expiration {
    /// Time until expiry, or `None` for pastes that never expire.
    ///
    /// "1m" and "1y" are fixed 30/365-day windows.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Expiration::Never => None,
            Expiration::TenMinutes => Some(Duration::minutes(10)),
            Expiration::OneHour => Some(Duration::hours(1)),
            Expiration::OneDay => Some(Duration::days(1)),
            Expiration::OneWeek => Some(Duration::weeks(1)),
            Expiration::OneMonth => Some(Duration::days(30)),
            Expiration::OneYear => Some(Duration::days(365)),
        }
    }

    /// Compute the absolute expiry timestamp from a creation time
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| created_at + d)
    }
}

impl std::fmt::Display for Expiration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Expiration::Never => "never",
            Expiration::TenMinutes => "10m",
            Expiration::OneHour => "1h",
            Expiration::OneDay => "1d",
            Expiration::OneWeek => "1w",
            Expiration::OneMonth => "1m",
            Expiration::OneYear => "1y",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Expiration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Expiration::Never),
            "10m" => Ok(Expiration::TenMinutes),
            "1h" => Ok(Expiration::OneHour),
            "1d" => Ok(Expiration::OneDay),
            "1w" => Ok(Expiration::OneWeek),
            "1m" => Ok(Expiration::OneMonth),
            "1y" => Ok(Expiration::OneYear),
            _ => Err(format!("Unknown expiration: {}", s)),
        }
    }
}

/// Paste entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paste {
    pub id: i64,
    pub title: Option<String>,
    pub content: String,
    pub syntax: Syntax,
    pub expiration: Expiration,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub views: i64,
    pub likes: i64,
    pub comments_count: i64,
    pub is_private: bool,
    pub short_url: String,
}

impl Paste {
    /// Whether the paste has passed its expiry timestamp
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    /// Filename for download responses, derived from the title when present
    pub fn download_filename(&self) -> String {
        let stem = match &self.title {
            Some(title) if !title.trim().is_empty() => title
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                .collect::<String>(),
            _ => format!("paste_{}", self.id),
        };
        format!("{}.{}", stem, self.syntax.extension())
    }
}

/// Input for creating a paste
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePasteInput {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub syntax: Syntax,
    #[serde(default)]
    pub expiration: Expiration,
    #[serde(default)]
    pub is_private: bool,
}

/// Time window for the trending listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrendingPeriod {
    Day,
    #[default]
    Week,
    Month,
    All,
}

impl TrendingPeriod {
    /// Earliest creation time admitted into the window, or `None` for all time
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TrendingPeriod::Day => Some(now - Duration::days(1)),
            TrendingPeriod::Week => Some(now - Duration::weeks(1)),
            TrendingPeriod::Month => Some(now - Duration::days(30)),
            TrendingPeriod::All => None,
        }
    }
}

impl std::fmt::Display for TrendingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrendingPeriod::Day => "day",
            TrendingPeriod::Week => "week",
            TrendingPeriod::Month => "month",
            TrendingPeriod::All => "all",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TrendingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TrendingPeriod::Day),
            "week" => Ok(TrendingPeriod::Week),
            "month" => Ok(TrendingPeriod::Month),
            "all" => Ok(TrendingPeriod::All),
            _ => Err(format!("Unknown trending period: {}", s)),
        }
    }
}

/// Aggregate counters for the info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteStatistics {
    pub total_pastes: i64,
    pub active_pastes: i64,
    pub total_views: i64,
    pub total_comments: i64,
}
