//! Output module for rendering scan results
//!
//! This module handles:
//! - Serializing scan results as JSON
//! - Generating markdown summaries
//! - Computing and printing scan statistics

mod markdown;
pub mod stats;

pub use markdown::format_markdown_summary;
pub use stats::{format_statistics, print_statistics, ScanStatistics};

use crate::catalog::ScanResult;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Rendering format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!(
                "unknown output format '{}' (expected json or markdown)",
                other
            )),
        }
    }
}

/// Serializes a scan result as JSON
pub fn render_json(result: &ScanResult, pretty: bool) -> OutputResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Renders a scan result in the requested format
pub fn render(result: &ScanResult, format: OutputFormat, pretty: bool) -> OutputResult<String> {
    match format {
        OutputFormat::Json => render_json(result, pretty),
        OutputFormat::Markdown => Ok(format_markdown_summary(result)),
    }
}

/// Writes rendered output to a file, or to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> OutputResult<()> {
    match path {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}
