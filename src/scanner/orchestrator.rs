//! Scan orchestration
//!
//! The [`Scanner`] ties the pipeline together:
//! 1. Fetch the listing (fatal on failure)
//! 2. Normalize every item, skipping malformed ones
//! 3. On a deep scan, enrich servers from their detail pages
//! 4. Assemble the [`ScanResult`]

use crate::catalog::{normalize_all, CatalogUrls, ScanResult};
use crate::config::{validate, Config};
use crate::scanner::enrich::enrich;
use crate::scanner::extractor::DetailExtractor;
use crate::scanner::fetcher::{build_http_client, fetch_listing};
use crate::ScoutError;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Marketplace scanner
///
/// Owns the HTTP client for its lifetime; each call to [`Scanner::scan`]
/// builds a fresh working set, so a scanner can be reused for any number
/// of independent scans.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: Arc<Config>,
    client: Client,
    extractor: DetailExtractor,
    urls: CatalogUrls,
}

impl Scanner {
    /// Creates a scanner with an HTTP client built from the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Scanner)` - Configuration is valid and the client was built
    /// * `Err(ScoutError)` - Invalid configuration or client construction failure
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        let client = build_http_client(&config)?;
        Self::with_client(config, client)
    }

    /// Creates a scanner that uses the given HTTP client
    pub fn with_client(config: Config, client: Client) -> Result<Self, ScoutError> {
        validate(&config)?;
        let urls = CatalogUrls::from_config(&config.marketplace);

        Ok(Self {
            config: Arc::new(config),
            client,
            extractor: DetailExtractor::new(),
            urls,
        })
    }

    /// Replaces the detail page extractor
    pub fn with_extractor(mut self, extractor: DetailExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scans the marketplace
    ///
    /// With `include_tools` false no detail page is requested and `errors`
    /// is always empty. With `include_tools` true every server's detail page
    /// is fetched; failures there are recorded per server and never abort
    /// the scan.
    ///
    /// # Errors
    ///
    /// Only listing-phase failures (`ScoutError::Fetch`,
    /// `ScoutError::MalformedResponse`) are returned.
    pub async fn scan(&self, include_tools: bool) -> Result<ScanResult, ScoutError> {
        let scanned_at = Utc::now();
        let start_time = Instant::now();

        tracing::info!(
            "Scanning marketplace at {} (include_tools: {})",
            self.config.marketplace.listing_url,
            include_tools
        );

        let items = fetch_listing(&self.client, &self.config.marketplace).await?;
        let (servers, skipped_items) = normalize_all(&items, &self.urls);

        if skipped_items > 0 {
            tracing::warn!("Skipped {} malformed listing items", skipped_items);
        }

        let (servers, errors) = if include_tools && !servers.is_empty() {
            enrich(
                &self.client,
                &self.extractor,
                servers,
                self.config.fetch.max_concurrent_fetches as usize,
            )
            .await
        } else {
            (servers, Vec::new())
        };

        let result = ScanResult::new(
            servers,
            errors,
            skipped_items,
            include_tools,
            scanned_at,
            start_time.elapsed().as_secs_f64(),
        );

        tracing::info!(
            "Scan completed: {} servers, {} errors in {:.2}s",
            result.total_servers,
            result.errors.len(),
            result.scan_duration_seconds
        );

        Ok(result)
    }
}

/// Runs a single scan with a freshly built scanner
///
/// # Example
///
/// ```no_run
/// use marketplace_scout::{scan_marketplace, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = scan_marketplace(Config::default(), false).await?;
/// println!("{} servers", result.total_servers);
/// # Ok(())
/// # }
/// ```
pub async fn scan_marketplace(config: Config, include_tools: bool) -> Result<ScanResult, ScoutError> {
    Scanner::new(config)?.scan(include_tools).await
}

/// Runs a single scan on a dedicated tokio runtime
///
/// For synchronous callers; returns only once every fetch has completed.
/// Must not be called from inside an async runtime.
pub fn scan_marketplace_blocking(
    config: Config,
    include_tools: bool,
) -> Result<ScanResult, ScoutError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(scan_marketplace(config, include_tools))
}
