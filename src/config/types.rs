use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Marketplace-Scout
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// working configuration pointed at the public marketplace.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Marketplace endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceConfig {
    /// Listing endpoint returning the `repositories` envelope
    #[serde(rename = "listing-url", default = "default_listing_url")]
    pub listing_url: String,

    /// Base URL of per-entry marketplace pages (`{base}/{slug}`)
    #[serde(rename = "detail-base-url", default = "default_detail_base_url")]
    pub detail_base_url: String,

    /// Base URL used to expand `git_slug` into a repository link
    #[serde(rename = "github-base-url", default = "default_github_base_url")]
    pub github_base_url: String,

    /// Upper bound on listing pages followed through `next` links
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

/// HTTP fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum number of detail pages fetched at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent")]
    pub max_concurrent_fetches: u32,
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scanner
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version of the scanner
    #[serde(default = "default_agent_version")]
    pub version: String,

    /// URL with information about the scanner
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.name, self.version, url),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            detail_base_url: default_detail_base_url(),
            github_base_url: default_github_base_url(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            max_concurrent_fetches: default_max_concurrent(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
            contact_url: None,
        }
    }
}

fn default_listing_url() -> String {
    "https://www.dedaluslabs.ai/api/marketplace".to_string()
}

fn default_detail_base_url() -> String {
    "https://www.dedaluslabs.ai/marketplace".to_string()
}

fn default_github_base_url() -> String {
    "https://github.com".to_string()
}

fn default_max_pages() -> u32 {
    50
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_concurrent() -> u32 {
    5
}

fn default_agent_name() -> String {
    "MarketplaceScout".to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
