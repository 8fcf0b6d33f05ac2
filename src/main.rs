//! Marketplace-Scout main entry point
//!
//! This is the command-line interface for the marketplace scanner.

use anyhow::Context;
use clap::Parser;
use marketplace_scout::config::{load_config_with_hash, Config};
use marketplace_scout::output::{print_statistics, render, write_output, OutputFormat, ScanStatistics};
use marketplace_scout::Scanner;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Marketplace-Scout: catalog the servers listed on an MCP marketplace
///
/// Fetches the marketplace listing, normalizes every entry and optionally
/// visits each entry's detail page to collect the tools it exposes.
#[derive(Parser, Debug)]
#[command(name = "marketplace-scout")]
#[command(version)]
#[command(about = "Catalog the servers listed on an MCP marketplace", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Fetch every server's detail page and extract its tools
    #[arg(long)]
    include_tools: bool,

    /// Output format: json or markdown
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print summary statistics to stderr after the scan
    #[arg(long)]
    stats: bool,

    /// Validate config and show what would be fetched without scanning
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.include_tools);
        return Ok(());
    }

    handle_scan(&cli, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("marketplace_scout=info,warn"),
            1 => EnvFilter::new("marketplace_scout=debug,info"),
            2 => EnvFilter::new("marketplace_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr; stdout carries the scan output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, include_tools: bool) {
    println!("=== Marketplace-Scout Dry Run ===\n");

    println!("Marketplace:");
    println!("  Listing URL: {}", config.marketplace.listing_url);
    println!("  Detail pages: {}/<slug>", config.marketplace.detail_base_url);
    println!("  Repository base: {}", config.marketplace.github_base_url);
    println!("  Max listing pages: {}", config.marketplace.max_pages);

    println!("\nFetch:");
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!(
        "  Max concurrent detail fetches: {}",
        config.fetch.max_concurrent_fetches
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
    if include_tools {
        println!("✓ Would fetch the listing and one detail page per server");
    } else {
        println!("✓ Would fetch the listing only");
    }
}

/// Handles the main scan operation
async fn handle_scan(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let scanner = Scanner::new(config).context("failed to initialize scanner")?;

    let result = match scanner.scan(cli.include_tools).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            return Err(e.into());
        }
    };

    let rendered = render(&result, cli.format, cli.pretty).context("failed to render output")?;
    write_output(&rendered, cli.output.as_deref()).context("failed to write output")?;

    if let Some(path) = &cli.output {
        tracing::info!("Scan output written to: {}", path.display());
    }

    if cli.stats {
        print_statistics(&ScanStatistics::from_result(&result));
    }

    Ok(())
}
