//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made by a scan:
//! - Building the HTTP client with user agent and timeouts
//! - GET requests with error classification
//! - The listing fetch, including `next`-link pagination

use crate::config::{Config, MarketplaceConfig};
use crate::ScoutError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Accept header sent with listing requests
pub const ACCEPT_JSON: &str = "application/json";

/// Accept header sent with detail page requests
pub const ACCEPT_DETAIL: &str = "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8";

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if missing)
        content_type: String,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Human-readable failure reason, `None` on success
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Some(error.clone()),
        }
    }
}

/// Returns true if a Content-Type header value denotes JSON
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

/// Builds an HTTP client with proper configuration
///
/// The client is a scoped resource: a `Scanner` owns one and hands it to
/// every fetch, so connections are reused within a scan without any global
/// state.
///
/// # Example
///
/// ```no_run
/// use marketplace_scout::config::Config;
/// use marketplace_scout::scanner::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.fetch.request_timeout())
        .connect_timeout(config.fetch.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` with body |
/// | Other status | `HttpError` |
/// | Timeout | `NetworkError("Request timeout")` |
/// | Connection failure | `NetworkError("Connection failed: ...")` |
/// | Body read failure | `NetworkError` |
///
/// No retries are attempted.
pub async fn fetch_url(client: &Client, url: &str, accept: &str) -> FetchResult {
    tracing::debug!("GET {}", url);

    let response = match client.get(url).header(ACCEPT, accept).send().await {
        Ok(response) => response,
        Err(e) => return classify_request_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_request_error(&e),
    }
}

fn classify_request_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

/// One page of the listing envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Raw items under `repositories`, in response order
    pub repositories: Vec<Value>,

    /// Link to the following page, if the endpoint paginates
    pub next: Option<String>,
}

/// Parses a listing response body into a [`ListingPage`]
///
/// The body must be a JSON object whose `repositories` key holds an array.
/// A `next` key counts only when it is a non-empty string.
pub fn parse_listing_page(url: &str, body: &str) -> Result<ListingPage, ScoutError> {
    let malformed = |reason: String| ScoutError::MalformedResponse {
        url: url.to_string(),
        reason,
    };

    let value: Value =
        serde_json::from_str(body).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    let Value::Object(mut envelope) = value else {
        return Err(malformed("expected a JSON object".to_string()));
    };

    let repositories = match envelope.remove("repositories") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(malformed("`repositories` is not an array".to_string())),
        None => return Err(malformed("missing `repositories` key".to_string())),
    };

    let next = envelope
        .get("next")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ListingPage { repositories, next })
}

/// Fetches the full marketplace listing
///
/// Issues a GET to the listing endpoint and follows `next` links until they
/// run out, preserving item order across pages. Pagination also stops on a
/// repeated URL or after `max_pages` pages.
///
/// # Errors
///
/// * `ScoutError::Fetch` - network failure or non-success status
/// * `ScoutError::MalformedResponse` - body lacks the `repositories` array
pub async fn fetch_listing(
    client: &Client,
    config: &MarketplaceConfig,
) -> Result<Vec<Value>, ScoutError> {
    let mut items = Vec::new();
    let mut visited = HashSet::new();
    let mut pages = 0u32;
    let mut next_url = Some(Url::parse(&config.listing_url)?);

    while let Some(url) = next_url.take() {
        if !visited.insert(url.to_string()) {
            tracing::warn!("Listing pagination revisited {}, stopping", url);
            break;
        }

        if pages >= config.max_pages {
            tracing::warn!(
                "Listing pagination stopped after {} pages (max-pages reached)",
                pages
            );
            break;
        }

        let page = fetch_listing_page(client, url.as_str()).await?;
        pages += 1;

        tracing::debug!(
            "Listing page {} returned {} items",
            pages,
            page.repositories.len()
        );
        items.extend(page.repositories);

        if let Some(next) = page.next {
            let resolved = url.join(&next).map_err(|e| ScoutError::MalformedResponse {
                url: url.to_string(),
                reason: format!("invalid `next` link '{}': {}", next, e),
            })?;
            next_url = Some(resolved);
        }
    }

    tracing::info!("Fetched {} listing items across {} page(s)", items.len(), pages);
    Ok(items)
}

async fn fetch_listing_page(client: &Client, url: &str) -> Result<ListingPage, ScoutError> {
    match fetch_url(client, url, ACCEPT_JSON).await {
        FetchResult::Success { body, .. } => parse_listing_page(url, &body),
        FetchResult::HttpError { status_code } => Err(ScoutError::Fetch {
            url: url.to_string(),
            status: Some(status_code),
            reason: format!("HTTP {}", status_code),
        }),
        FetchResult::NetworkError { error } => Err(ScoutError::Fetch {
            url: url.to_string(),
            status: None,
            reason: error,
        }),
    }
}
