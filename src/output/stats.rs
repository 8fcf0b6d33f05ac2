//! Summary statistics for a scan result
//!
//! This module derives counts from a [`ScanResult`] and renders them for
//! terminal display.

use crate::catalog::{AuthKind, Language, ScanResult};
use std::collections::BTreeMap;

/// Scan statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct ScanStatistics {
    /// Total number of servers in the result
    pub total_servers: usize,

    /// Count of servers by implementation language
    pub by_language: BTreeMap<Language, usize>,

    /// Count of servers by required authentication
    pub by_auth: BTreeMap<AuthKind, usize>,

    /// Servers flagged as verified
    pub verified_servers: usize,

    /// Servers with a repository link
    pub with_repository: usize,

    /// Servers whose detail page yielded a tool list
    pub enriched_servers: usize,

    /// Tools across all enriched servers
    pub total_tools: usize,

    /// Detail-page failures
    pub errors: usize,

    /// Listing items dropped during normalization
    pub skipped_items: usize,

    /// Wall-clock scan time
    pub duration_seconds: f64,
}

impl ScanStatistics {
    /// Computes statistics from a scan result
    pub fn from_result(result: &ScanResult) -> Self {
        let mut by_language = BTreeMap::new();
        let mut by_auth = BTreeMap::new();

        for server in &result.servers {
            *by_language.entry(server.language).or_insert(0) += 1;
            *by_auth.entry(server.auth).or_insert(0) += 1;
        }

        Self {
            total_servers: result.total_servers,
            by_language,
            by_auth,
            verified_servers: result.servers.iter().filter(|s| s.verified).count(),
            with_repository: result
                .servers
                .iter()
                .filter(|s| s.github_url.is_some())
                .count(),
            enriched_servers: result
                .servers
                .iter()
                .filter(|s| s.tools.is_some())
                .count(),
            total_tools: result.total_tools(),
            errors: result.errors.len(),
            skipped_items: result.skipped_items,
            duration_seconds: result.scan_duration_seconds,
        }
    }

    /// Percentage of servers whose detail page was read successfully
    pub fn enrichment_rate(&self) -> f64 {
        if self.total_servers == 0 {
            return 0.0;
        }
        (self.enriched_servers as f64 / self.total_servers as f64) * 100.0
    }
}

/// Formats statistics as an aligned plain-text block
pub fn format_statistics(stats: &ScanStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Scan Statistics ===\n\n");
    out.push_str("Overview:\n");
    out.push_str(&format!("  Servers: {}\n", stats.total_servers));
    out.push_str(&format!("  Verified: {}\n", stats.verified_servers));
    out.push_str(&format!("  With repository: {}\n", stats.with_repository));
    out.push_str(&format!("  Skipped items: {}\n", stats.skipped_items));
    out.push_str(&format!("  Duration: {:.2}s\n\n", stats.duration_seconds));

    out.push_str("By Language:\n");
    for language in Language::all() {
        let count = stats.by_language.get(&language).copied().unwrap_or(0);
        out.push_str(&format!("  {:<12} {}\n", language.as_str(), count));
    }
    out.push('\n');

    out.push_str("By Auth:\n");
    for auth in AuthKind::all() {
        let count = stats.by_auth.get(&auth).copied().unwrap_or(0);
        out.push_str(&format!("  {:<12} {}\n", auth.as_str(), count));
    }

    if stats.enriched_servers > 0 || stats.errors > 0 {
        out.push('\n');
        out.push_str("Tools:\n");
        out.push_str(&format!(
            "  Enriched: {} ({:.1}%)\n",
            stats.enriched_servers,
            stats.enrichment_rate()
        ));
        out.push_str(&format!("  Total tools: {}\n", stats.total_tools));
        out.push_str(&format!("  Detail errors: {}\n", stats.errors));
    }

    out
}

/// Prints statistics to stderr, keeping stdout free for scan output
pub fn print_statistics(stats: &ScanStatistics) {
    eprint!("{}", format_statistics(stats));
}
