//! Markdown summary generation
//!
//! This module renders a scan result as a human-readable markdown report:
//! overview statistics, a server table, per-server tool lists and errors.

use crate::catalog::ScanResult;
use crate::output::stats::ScanStatistics;

/// Formats a scan result as markdown
pub fn format_markdown_summary(result: &ScanResult) -> String {
    let stats = ScanStatistics::from_result(result);
    let mut md = String::new();

    md.push_str("# Marketplace Scan Summary\n\n");

    // Run metadata
    md.push_str("## Scan Information\n\n");
    md.push_str(&format!(
        "- **Scanned At**: {}\n",
        result.scanned_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        result.scan_duration_seconds
    ));
    md.push_str(&format!(
        "- **Deep Scan**: {}\n",
        if result.include_tools { "yes" } else { "no" }
    ));
    md.push_str(&format!("- **Servers**: {}\n", result.total_servers));
    md.push_str(&format!("- **Skipped Items**: {}\n", result.skipped_items));
    if result.include_tools {
        md.push_str(&format!("- **Total Tools**: {}\n", stats.total_tools));
        md.push_str(&format!("- **Detail Errors**: {}\n", stats.errors));
    }
    md.push('\n');

    // Language and auth breakdown
    md.push_str("## Breakdown\n\n");
    md.push_str("| Language | Servers |\n");
    md.push_str("|----------|---------|\n");
    for (language, count) in &stats.by_language {
        md.push_str(&format!("| {} | {} |\n", language, count));
    }
    md.push('\n');
    md.push_str("| Auth | Servers |\n");
    md.push_str("|------|---------|\n");
    for (auth, count) in &stats.by_auth {
        md.push_str(&format!("| {} | {} |\n", auth, count));
    }
    md.push('\n');

    // Server table
    if !result.servers.is_empty() {
        md.push_str("## Servers\n\n");
        md.push_str("| Slug | Language | Auth | Heat | Upvotes | Repository |\n");
        md.push_str("|------|----------|------|------|---------|------------|\n");

        for server in &result.servers {
            md.push_str(&format!(
                "| [{}]({}) | {} | {} | {} | {} | {} |\n",
                escape_cell(&server.slug),
                server.marketplace_url,
                server.language,
                server.auth,
                display_opt(server.heat_score),
                display_opt(server.upvote_count),
                server
                    .github_url
                    .as_deref()
                    .map(|url| format!("<{}>", url))
                    .unwrap_or_else(|| "-".to_string()),
            ));
        }
        md.push('\n');
    }

    // Tools per server
    let enriched: Vec<_> = result
        .servers
        .iter()
        .filter_map(|s| s.tools.as_ref().map(|tools| (s, tools)))
        .filter(|(_, tools)| !tools.is_empty())
        .collect();

    if !enriched.is_empty() {
        md.push_str("## Tools\n\n");
        for (server, tools) in enriched {
            md.push_str(&format!("### {}\n\n", server.slug));
            for tool in tools {
                match &tool.description {
                    Some(description) => {
                        md.push_str(&format!("- `{}`: {}\n", tool.name, description))
                    }
                    None => md.push_str(&format!("- `{}`\n", tool.name)),
                }
            }
            md.push('\n');
        }
    }

    // Detail errors
    if !result.errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| Server | Reason |\n");
        md.push_str("|--------|--------|\n");
        for error in &result.errors {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&error.slug),
                escape_cell(&error.reason)
            ));
        }
        md.push('\n');
    }

    md
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
