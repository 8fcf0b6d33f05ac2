//! Concurrent detail-page enrichment
//!
//! This module fans the detail extractor out over every server:
//! - One tokio task per server
//! - A global semaphore bounds how many fetches are in flight
//! - Results are joined in input order, whatever order tasks finish in
//!
//! A failed (or panicked) task only affects its own server, which keeps
//! `tools` absent and gains an entry in the error list.

use crate::catalog::{MarketplaceServer, Tool};
use crate::scanner::extractor::DetailExtractor;
use crate::ExtractionError;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Enriches servers with tools scraped from their detail pages
///
/// # Arguments
///
/// * `client` - The HTTP client shared by all detail fetches
/// * `extractor` - The detail page extractor
/// * `servers` - Servers in listing order
/// * `max_concurrent` - Maximum detail fetches in flight (at least 1)
///
/// # Returns
///
/// The servers in their original order, with `tools` set where extraction
/// succeeded, and the extraction errors in the same order.
pub async fn enrich(
    client: &Client,
    extractor: &DetailExtractor,
    mut servers: Vec<MarketplaceServer>,
    max_concurrent: usize,
) -> (Vec<MarketplaceServer>, Vec<ExtractionError>) {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

    tracing::info!(
        "Fetching detail pages for {} servers ({} at a time)",
        servers.len(),
        max_concurrent.max(1)
    );

    let handles: Vec<JoinHandle<Result<Vec<Tool>, ExtractionError>>> = servers
        .iter()
        .map(|server| {
            let client = client.clone();
            let extractor = extractor.clone();
            let semaphore = Arc::clone(&semaphore);
            let server = server.clone();

            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|_| {
                    ExtractionError::new(&server.slug, "detail worker pool closed")
                })?;
                extractor.extract_tools(&client, &server).await
            })
        })
        .collect();

    let mut errors = Vec::new();

    // Awaiting handles in spawn order keeps results aligned with input order
    for (server, handle) in servers.iter_mut().zip(handles) {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Detail task for {} failed: {}", server.slug, e);
                Err(ExtractionError::new(&server.slug, "detail task panicked"))
            }
        };

        match outcome {
            Ok(tools) => {
                tracing::debug!("{}: {} tools", server.slug, tools.len());
                server.tools = Some(tools);
            }
            Err(e) => {
                tracing::warn!("Detail extraction failed for {}", e);
                errors.push(e);
            }
        }
    }

    tracing::info!(
        "Detail enrichment finished: {} succeeded, {} failed",
        servers.len() - errors.len(),
        errors.len()
    );

    (servers, errors)
}
