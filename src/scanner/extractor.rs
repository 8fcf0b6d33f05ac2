//! Detail page tool extraction
//!
//! A deep scan visits every server's marketplace page and pulls out the tools
//! it lists. Pages are parsed by a chain of [`ToolParser`] strategies:
//! - Structured data first (a JSON body, or JSON embedded in `<script>` blocks)
//! - Then a heuristic scan of tool "cards" in the rendered HTML
//!
//! The first strategy that yields at least one tool wins. A page with no
//! recognizable tools is a valid, empty result; only fetch failures and
//! unreadable JSON payloads are errors.

use crate::catalog::{MarketplaceServer, Tool};
use crate::scanner::fetcher::{fetch_url, is_json_content_type, FetchResult, ACCEPT_DETAIL};
use crate::ExtractionError;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::Arc;

/// Maximum nesting depth searched for a `tools` array in JSON payloads
const MAX_JSON_DEPTH: usize = 32;

/// Section and footer headings that share the tool card styling
const EXCLUDED_HEADINGS: &[&str] = &[
    "Tools",
    "Resources",
    "Prompts",
    "Product",
    "Company",
    "Legal",
    "Documentation",
    "Support",
    "Contact",
    "About",
    "Blog",
    "Pricing",
];

/// A strategy for pulling tools out of a detail page body
///
/// Returning `None` means the strategy found nothing it recognizes, and the
/// next strategy in the chain gets a turn.
pub trait ToolParser: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Parses tools from a page body
    fn parse(&self, body: &str) -> Option<Vec<Tool>>;
}

/// Finds a `tools` array in JSON bodies or embedded JSON script blocks
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredDataParser;

impl ToolParser for StructuredDataParser {
    fn name(&self) -> &'static str {
        "structured-data"
    }

    fn parse(&self, body: &str) -> Option<Vec<Tool>> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return find_tools(&value, 0);
            }
        }

        let document = Html::parse_document(body);
        let selector = Selector::parse(
            r#"script[type="application/json"], script[type="application/ld+json"], script#__NEXT_DATA__"#,
        )
        .ok()?;

        let tools = document.select(&selector).find_map(|script| {
            let text = script.text().collect::<String>();
            serde_json::from_str::<Value>(text.trim())
                .ok()
                .and_then(|value| find_tools(&value, 0))
        });
        tools
    }
}

/// Heuristic scan of server-rendered tool cards
///
/// # Card Rules
///
/// - Tool names are `<h4>` elements whose class attribute mentions both `text-lg` and
///   `font-semibold` classes
/// - Blank names, known section headings and all-uppercase names are skipped
/// - The description is the next sibling `<p>` before another `<h4>`
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingCardParser;

impl ToolParser for HeadingCardParser {
    fn name(&self) -> &'static str {
        "heading-cards"
    }

    fn parse(&self, body: &str) -> Option<Vec<Tool>> {
        let document = Html::parse_document(body);
        let selector = Selector::parse("h4").ok()?;

        let tools: Vec<Tool> = document
            .select(&selector)
            .filter(|h4| {
                // Substring match so variants like `md:text-lg` still count
                let class = h4.value().attr("class").unwrap_or_default();
                class.contains("text-lg") && class.contains("font-semibold")
            })
            .filter_map(|h4| {
                let name = collapse_whitespace(&h4.text().collect::<String>());
                if !is_tool_name(&name) {
                    return None;
                }
                Some(Tool::new(name, sibling_description(h4)))
            })
            .collect();

        if tools.is_empty() {
            None
        } else {
            Some(tools)
        }
    }
}

/// Fetches detail pages and runs the parser chain over them
#[derive(Clone)]
pub struct DetailExtractor {
    parsers: Arc<Vec<Box<dyn ToolParser>>>,
}

impl DetailExtractor {
    /// Creates an extractor with the default parser chain
    pub fn new() -> Self {
        Self::with_parsers(vec![
            Box::new(StructuredDataParser),
            Box::new(HeadingCardParser),
        ])
    }

    /// Creates an extractor with a custom parser chain, tried in order
    pub fn with_parsers(parsers: Vec<Box<dyn ToolParser>>) -> Self {
        Self {
            parsers: Arc::new(parsers),
        }
    }

    /// Fetches a server's detail page and extracts its tools
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Tool>)` - Tools found on the page (possibly empty)
    /// * `Err(ExtractionError)` - The page could not be fetched or read
    pub async fn extract_tools(
        &self,
        client: &Client,
        server: &MarketplaceServer,
    ) -> Result<Vec<Tool>, ExtractionError> {
        let url = server.marketplace_url.as_str();

        match fetch_url(client, url, ACCEPT_DETAIL).await {
            FetchResult::Success {
                content_type, body, ..
            } => self
                .parse_body(&content_type, &body)
                .map_err(|reason| ExtractionError::new(&server.slug, reason)),
            failure => {
                let reason = failure
                    .failure_reason()
                    .unwrap_or_else(|| "unknown fetch failure".to_string());
                Err(ExtractionError::new(
                    &server.slug,
                    format!("Failed to fetch {}: {}", url, reason),
                ))
            }
        }
    }

    /// Runs the parser chain over a fetched body
    ///
    /// A body served as JSON must parse as JSON; anything else is best-effort.
    pub fn parse_body(&self, content_type: &str, body: &str) -> Result<Vec<Tool>, String> {
        if is_json_content_type(content_type) {
            serde_json::from_str::<Value>(body)
                .map_err(|e| format!("malformed JSON detail payload: {}", e))?;
        }

        for parser in self.parsers.iter() {
            if let Some(tools) = parser.parse(body).filter(|t| !t.is_empty()) {
                tracing::debug!("{} parser found {} tools", parser.name(), tools.len());
                return Ok(tools);
            }
        }

        Ok(Vec::new())
    }
}

impl Default for DetailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DetailExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.parsers.iter().map(|p| p.name()).collect();
        f.debug_struct("DetailExtractor")
            .field("parsers", &names)
            .finish()
    }
}

/// Depth-first search for the first non-empty `tools` array
fn find_tools(value: &Value, depth: usize) -> Option<Vec<Tool>> {
    if depth > MAX_JSON_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("tools") {
                let tools: Vec<Tool> = items.iter().filter_map(tool_from_value).collect();
                if !tools.is_empty() {
                    return Some(tools);
                }
            }
            map.values().find_map(|v| find_tools(v, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|v| find_tools(v, depth + 1)),
        _ => None,
    }
}

fn tool_from_value(value: &Value) -> Option<Tool> {
    match value {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| Tool::new(name, None))
        }
        Value::Object(map) => {
            let name = map.get("name").and_then(Value::as_str)?.trim();
            if name.is_empty() {
                return None;
            }
            let description = map
                .get("description")
                .and_then(Value::as_str)
                .map(collapse_whitespace)
                .filter(|d| !d.is_empty());
            Some(Tool::new(name, description))
        }
        _ => None,
    }
}

fn is_tool_name(name: &str) -> bool {
    if name.is_empty() || EXCLUDED_HEADINGS.contains(&name) {
        return false;
    }

    // All-uppercase headings are section labels; caseless scripts are not
    let has_upper = name.chars().any(char::is_uppercase);
    let has_lower = name.chars().any(char::is_lowercase);
    !has_upper || has_lower
}

fn sibling_description(heading: ElementRef<'_>) -> Option<String> {
    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        match sibling.value().name() {
            "p" => {
                let text = collapse_whitespace(&sibling.text().collect::<String>());
                return (!text.is_empty()).then_some(text);
            }
            "h4" => return None,
            _ => continue,
        }
    }
    None
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
