//! Scanner module for marketplace fetching and enrichment
//!
//! This module contains the fetch-and-normalize pipeline, including:
//! - HTTP fetching of the listing endpoint (with pagination)
//! - Detail page tool extraction through replaceable parser strategies
//! - Bounded concurrent enrichment of normalized servers
//! - Overall scan orchestration

mod enrich;
mod extractor;
mod fetcher;
mod orchestrator;

pub use enrich::enrich;
pub use extractor::{DetailExtractor, HeadingCardParser, StructuredDataParser, ToolParser};
pub use fetcher::{
    build_http_client, fetch_listing, fetch_url, is_json_content_type, parse_listing_page,
    FetchResult, ListingPage,
};
pub use orchestrator::{scan_marketplace, scan_marketplace_blocking, Scanner};
