//! Configuration module for Marketplace-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All settings have defaults, so a configuration file is optional.
//!
//! # Example
//!
//! ```no_run
//! use marketplace_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Detail fetch concurrency: {}", config.fetch.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, MarketplaceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
