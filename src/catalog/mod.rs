//! Catalog module for marketplace records
//!
//! This module defines the records a scan produces and the normalizer that
//! builds them from raw listing items.
//!
//! # Components
//!
//! - `MarketplaceServer` / `Tool`: one catalog entry and the tools it exposes
//! - `ScanResult`: the aggregate returned by a scan
//! - `normalize`: raw JSON item to `MarketplaceServer`

mod normalize;
mod types;

// Re-export main types
pub use normalize::{normalize, normalize_all, split_slug, CatalogUrls, UNKNOWN_PUBLISHER};
pub use types::{AuthKind, Language, MarketplaceServer, ScanResult, Tool};
