/// Catalog record types produced by a scan
///
/// These are plain serde data types; every scan builds them fresh and hands
/// them to the caller inside a [`ScanResult`].
use crate::ExtractionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Implementation language of a marketplace server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    Python,
    Unknown,
}

impl Language {
    /// Maps a free-form language tag onto a known language
    ///
    /// Matching is case-insensitive; anything unrecognized is `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Self::TypeScript,
            "python" | "py" => Self::Python,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::TypeScript, Self::Python, Self::Unknown]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication scheme a marketplace server requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    ApiKey,
    Oauth,
    None,
    Unknown,
}

impl AuthKind {
    /// Resolves the auth kind from the listing's boolean flags
    ///
    /// Precedence is fixed: `api_key` > `oauth` > `none`. With no flag set the
    /// result is `Unknown`.
    pub fn from_flags(api_key: bool, oauth: bool, none: bool) -> Self {
        if api_key {
            Self::ApiKey
        } else if oauth {
            Self::Oauth
        } else if none {
            Self::None
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::Oauth => "oauth",
            Self::None => "none",
            Self::Unknown => "unknown",
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::ApiKey, Self::Oauth, Self::None, Self::Unknown]
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single tool exposed by a marketplace server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: Option<String>,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// One catalog entry from the marketplace listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceServer {
    /// Full `publisher/name` identifier
    pub slug: String,
    pub publisher: String,
    pub name: String,

    /// Display title, when the listing provides one
    pub title: Option<String>,
    pub description: Option<String>,

    /// Source repository link
    pub github_url: Option<String>,

    /// The entry's own page on the marketplace; fetched on deep scans
    pub marketplace_url: String,

    pub language: Language,

    /// Popularity metric in [0, 100]
    pub heat_score: Option<u8>,
    pub upvote_count: Option<u64>,
    pub auth: AuthKind,
    pub verified: bool,

    /// Use-case tags flagged true in the listing, sorted
    pub use_cases: Vec<String>,

    /// Only populated by a deep scan whose detail fetch succeeded
    pub tools: Option<Vec<Tool>>,
}

/// Aggregate result of one scan invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Servers in listing order
    pub servers: Vec<MarketplaceServer>,
    pub total_servers: usize,
    pub scan_duration_seconds: f64,

    /// Detail-page failures, in listing order
    pub errors: Vec<ExtractionError>,

    /// Raw listing items dropped because they could not be normalized
    pub skipped_items: usize,
    pub include_tools: bool,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    /// Assembles a result, deriving `total_servers` from `servers`
    pub fn new(
        servers: Vec<MarketplaceServer>,
        errors: Vec<ExtractionError>,
        skipped_items: usize,
        include_tools: bool,
        scanned_at: DateTime<Utc>,
        scan_duration_seconds: f64,
    ) -> Self {
        Self {
            total_servers: servers.len(),
            servers,
            scan_duration_seconds,
            errors,
            skipped_items,
            include_tools,
            scanned_at,
        }
    }

    /// Total number of tools across all enriched servers
    pub fn total_tools(&self) -> usize {
        self.servers
            .iter()
            .filter_map(|s| s.tools.as_ref())
            .map(Vec::len)
            .sum()
    }

    /// Looks up a server by slug (first match)
    pub fn server(&self, slug: &str) -> Option<&MarketplaceServer> {
        self.servers.iter().find(|s| s.slug == slug)
    }
}
