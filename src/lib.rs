//! Marketplace-Scout: a catalog scanner for MCP server marketplaces
//!
//! This crate fetches the marketplace listing endpoint, normalizes every entry
//! into a [`MarketplaceServer`] record and, on a deep scan, visits each entry's
//! detail page to collect the tools it exposes.

pub mod catalog;
pub mod config;
pub mod output;
pub mod scanner;

use thiserror::Error;

/// Main error type for Marketplace-Scout operations
///
/// Only listing-phase failures surface through this type. Per-entry problems
/// during enrichment are reported as [`ExtractionError`]s inside the scan result.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Malformed listing response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Returns the HTTP status code for fetch failures that carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a raw listing item is dropped by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("item is not a JSON object")]
    NotAnObject,

    #[error("item has no usable slug")]
    MissingSlug,
}

/// A detail page that could not be fetched or read
///
/// The owning server still appears in the scan result, with `tools` absent.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("{slug}: {reason}")]
pub struct ExtractionError {
    pub slug: String,
    pub reason: String,
}

impl ExtractionError {
    pub fn new(slug: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for Marketplace-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

// Re-export commonly used types
pub use catalog::{AuthKind, Language, MarketplaceServer, ScanResult, Tool};
pub use config::Config;
pub use scanner::{scan_marketplace, scan_marketplace_blocking, Scanner};
