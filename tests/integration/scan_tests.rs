//! Integration tests for the scanner
//!
//! These tests use wiremock to stand in for the marketplace listing endpoint
//! and its detail pages, and exercise full scans end-to-end.

use marketplace_scout::config::{Config, FetchConfig, MarketplaceConfig};
use marketplace_scout::scanner::{DetailExtractor, HeadingCardParser, ToolParser};
use marketplace_scout::{AuthKind, Language, ScoutError, Scanner, Tool};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, max_concurrent_fetches: u32) -> Config {
    Config {
        marketplace: MarketplaceConfig {
            listing_url: format!("{}/api/marketplace", base_url),
            detail_base_url: format!("{}/marketplace", base_url),
            ..MarketplaceConfig::default()
        },
        fetch: FetchConfig {
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            max_concurrent_fetches,
        },
        ..Config::default()
    }
}

fn listing_item(slug: &str) -> Value {
    json!({
        "repo_id": format!("repo-{}", slug),
        "slug": slug,
        "git_slug": format!("{}-repo", slug),
        "description": format!("Description of {}", slug),
        "heat_score": 50,
        "upvote_count": 3,
        "tags": {
            "auth": {"none": true, "oauth": false, "api_key": false},
            "language": "typescript",
            "use_cases": {}
        }
    })
}

fn tool_page(tools: &[&str]) -> String {
    let cards: String = tools
        .iter()
        .map(|tool| {
            format!(
                r#"<div data-slot="card">
                    <h4 class="text-lg font-semibold break-words">{}</h4>
                    <p class="text-muted-foreground text-sm">Runs {}.</p>
                </div>"#,
                tool, tool
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Server</title></head><body><div class="space-y-3">{}</div>
        <footer><h4 class="mb-4 text-sm font-semibold uppercase">Product</h4></footer></body></html>"#,
        cards
    )
}

async fn mount_listing(mock_server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/marketplace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

async fn mount_detail(mock_server: &MockServer, slug: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/marketplace/{}", slug)))
        .respond_with(template)
        .mount(mock_server)
        .await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_scan_without_tools_never_fetches_details() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        json!({
            "repositories": [
                {
                    "repo_id": "test-repo-1",
                    "slug": "testpub/test-server",
                    "git_slug": "testpub/test-server-repo",
                    "title": "Test Server",
                    "subtitle": "A test MCP server",
                    "description": "This is a comprehensive test server.",
                    "upvote_count": 10,
                    "heat_score": 85,
                    "tags": {
                        "auth": {"none": false, "oauth": false, "api_key": true},
                        "language": "python",
                        "verified": true,
                        "use_cases": {"search": true, "database": false}
                    }
                },
                {
                    "repo_id": "test-repo-2",
                    "slug": "anotherpub/another-server",
                    "git_slug": "anotherpub/another-repo",
                    "title": null,
                    "subtitle": "Another server subtitle",
                    "description": null,
                    "tags": {
                        "auth": {"none": true, "oauth": false, "api_key": false},
                        "language": "typescript"
                    }
                }
            ]
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/marketplace/.*"))
        .respond_with(html(tool_page(&["never"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let result = scanner.scan(false).await.expect("Scan failed");

    assert_eq!(result.total_servers, 2);
    assert_eq!(result.servers.len(), 2);
    assert!(result.errors.is_empty());
    assert!(!result.include_tools);

    let first = &result.servers[0];
    assert_eq!(first.name, "test-server");
    assert_eq!(first.publisher, "testpub");
    assert_eq!(
        first.github_url.as_deref(),
        Some("https://github.com/testpub/test-server-repo")
    );
    assert_eq!(first.language, Language::Python);
    assert_eq!(first.auth, AuthKind::ApiKey);
    assert_eq!(first.heat_score, Some(85));
    assert_eq!(first.use_cases, vec!["search"]);
    assert!(first.verified);
    assert!(first.tools.is_none());

    let second = &result.servers[1];
    assert_eq!(second.name, "another-server");
    assert_eq!(second.publisher, "anotherpub");
    assert_eq!(second.description.as_deref(), Some("Another server subtitle"));
    assert_eq!(second.auth, AuthKind::None);
    assert_eq!(second.heat_score, None);
    assert!(second.tools.is_none());
}

#[tokio::test]
async fn test_scan_with_tools_tolerates_one_failure() {
    let mock_server = MockServer::start().await;
    let slugs = ["pub/alpha", "pub/beta", "pub/gamma", "pub/delta", "pub/epsilon"];

    mount_listing(
        &mock_server,
        json!({ "repositories": slugs.iter().map(|s| listing_item(s)).collect::<Vec<_>>() }),
    )
    .await;

    for slug in slugs {
        if slug == "pub/gamma" {
            mount_detail(&mock_server, slug, ResponseTemplate::new(500)).await;
        } else {
            let tool = format!("{}_tool", slug.trim_start_matches("pub/"));
            mount_detail(&mock_server, slug, html(tool_page(&[&tool]))).await;
        }
    }

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let result = scanner.scan(true).await.expect("Scan failed");

    assert_eq!(result.total_servers, 5);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].slug, "pub/gamma");
    assert!(result.errors[0].reason.contains("HTTP 500"));

    for server in &result.servers {
        if server.slug == "pub/gamma" {
            assert!(server.tools.is_none());
        } else {
            let tools = server.tools.as_ref().expect("tools should be populated");
            assert_eq!(tools.len(), 1);
            assert!(tools[0].name.ends_with("_tool"));
            assert!(tools[0].description.is_some());
        }
    }
}

#[tokio::test]
async fn test_scan_preserves_listing_order_under_random_delays() {
    let mock_server = MockServer::start().await;
    let slugs: Vec<String> = (0..12).map(|i| format!("order/server-{:02}", i)).collect();

    mount_listing(
        &mock_server,
        json!({ "repositories": slugs.iter().map(|s| listing_item(s)).collect::<Vec<_>>() }),
    )
    .await;

    // Scrambled delays so completion order differs from listing order
    for (i, slug) in slugs.iter().enumerate() {
        let delay = Duration::from_millis(((i * 37) % 11) as u64 * 15);
        mount_detail(&mock_server, slug, html(tool_page(&["t"])).set_delay(delay)).await;
    }

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 4)).unwrap();
    let result = scanner.scan(true).await.expect("Scan failed");

    let order: Vec<&str> = result.servers.iter().map(|s| s.slug.as_str()).collect();
    let expected: Vec<&str> = slugs.iter().map(String::as_str).collect();
    assert_eq!(order, expected);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_detail_fetches_are_bounded() {
    let mock_server = MockServer::start().await;
    let slugs: Vec<String> = (0..6).map(|i| format!("slow/server-{}", i)).collect();

    mount_listing(
        &mock_server,
        json!({ "repositories": slugs.iter().map(|s| listing_item(s)).collect::<Vec<_>>() }),
    )
    .await;

    for slug in &slugs {
        mount_detail(
            &mock_server,
            slug,
            html(tool_page(&["t"])).set_delay(Duration::from_millis(200)),
        )
        .await;
    }

    // Six 200ms fetches, two at a time, take at least three rounds
    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 2)).unwrap();
    let start = Instant::now();
    let result = scanner.scan(true).await.expect("Scan failed");

    assert!(start.elapsed() >= Duration::from_millis(550));
    assert!(result.scan_duration_seconds >= 0.55);
    assert_eq!(result.total_tools(), 6);
}

#[tokio::test]
async fn test_repeated_scans_are_identical() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        json!({ "repositories": [listing_item("a/one"), listing_item("b/two"), {"no_slug": true}] }),
    )
    .await;
    mount_detail(&mock_server, "a/one", html(tool_page(&["x", "y"]))).await;
    mount_detail(&mock_server, "b/two", ResponseTemplate::new(404)).await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let first = scanner.scan(true).await.expect("First scan failed");
    let second = scanner.scan(true).await.expect("Second scan failed");

    assert_eq!(first.servers, second.servers);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.skipped_items, 1);
    assert_eq!(second.skipped_items, 1);
}

#[tokio::test]
async fn test_listing_server_error_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/marketplace"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let err = scanner.scan(false).await.unwrap_err();

    assert!(matches!(err, ScoutError::Fetch { .. }));
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_listing_not_a_list_is_malformed() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, json!({ "repositories": "not-a-list" })).await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let err = scanner.scan(true).await.unwrap_err();

    assert!(matches!(err, ScoutError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_scan_empty_marketplace() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, json!({ "repositories": [] })).await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let result = scanner.scan(true).await.expect("Scan failed");

    assert_eq!(result.total_servers, 0);
    assert!(result.servers.is_empty());
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_scan_follows_paginated_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/marketplace/page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repositories": [listing_item("p/three")],
            "next": null
        })))
        .mount(&mock_server)
        .await;
    mount_listing(
        &mock_server,
        json!({
            "repositories": [listing_item("p/one"), listing_item("p/two")],
            "next": format!("{}/api/marketplace/page-2", mock_server.uri())
        }),
    )
    .await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let result = scanner.scan(false).await.expect("Scan failed");

    let slugs: Vec<&str> = result.servers.iter().map(|s| s.slug.as_str()).collect();
    assert_eq!(slugs, vec!["p/one", "p/two", "p/three"]);
}

#[tokio::test]
async fn test_json_detail_pages() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        json!({ "repositories": [listing_item("j/good"), listing_item("j/bad"), listing_item("j/none")] }),
    )
    .await;
    mount_detail(
        &mock_server,
        "j/good",
        ResponseTemplate::new(200).set_body_json(json!({
            "slug": "j/good",
            "tools": [
                {"name": "lookup", "description": "Look things up"},
                {"name": "store"}
            ]
        })),
    )
    .await;
    mount_detail(
        &mock_server,
        "j/bad",
        ResponseTemplate::new(200)
            .set_body_string("{\"tools\": [")
            .insert_header("content-type", "application/json"),
    )
    .await;
    mount_detail(
        &mock_server,
        "j/none",
        html("<html><body><p>No tools here.</p></body></html>".to_string()),
    )
    .await;

    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 5)).unwrap();
    let result = scanner.scan(true).await.expect("Scan failed");

    let good = result.server("j/good").unwrap();
    let tools = good.tools.as_ref().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "lookup");
    assert_eq!(tools[0].description.as_deref(), Some("Look things up"));
    assert_eq!(tools[1].description, None);

    let bad = result.server("j/bad").unwrap();
    assert!(bad.tools.is_none());

    let none = result.server("j/none").unwrap();
    assert_eq!(none.tools.as_deref(), Some(&[][..]));

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].slug, "j/bad");
    assert!(result.errors[0].reason.contains("malformed JSON"));
}

/// Reads tools from a plain-text `tool: description` format
struct LineParser;

impl ToolParser for LineParser {
    fn name(&self) -> &'static str {
        "lines"
    }

    fn parse(&self, body: &str) -> Option<Vec<Tool>> {
        let tools: Vec<Tool> = body
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(name, description)| {
                Tool::new(name.trim(), Some(description.trim().to_string()))
            })
            .collect();
        (!tools.is_empty()).then_some(tools)
    }
}

#[tokio::test]
async fn test_scan_with_custom_parser_chain() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        json!({ "repositories": [listing_item("c/plain"), listing_item("c/html")] }),
    )
    .await;
    mount_detail(
        &mock_server,
        "c/plain",
        ResponseTemplate::new(200)
            .set_body_string("list_files: List a directory\nread_file: Read one file\n")
            .insert_header("content-type", "text/plain"),
    )
    .await;
    mount_detail(&mock_server, "c/html", html(tool_page(&["card_tool"]))).await;

    let extractor = DetailExtractor::with_parsers(vec![
        Box::new(LineParser),
        Box::new(HeadingCardParser),
    ]);
    let scanner = Scanner::new(create_test_config(&mock_server.uri(), 2))
        .unwrap()
        .with_extractor(extractor);
    let result = scanner.scan(true).await.expect("Scan failed");

    assert!(result.errors.is_empty());

    let plain = result.server("c/plain").unwrap();
    assert_eq!(
        plain.tools.as_deref(),
        Some(
            &[
                Tool::new("list_files", Some("List a directory".to_string())),
                Tool::new("read_file", Some("Read one file".to_string())),
            ][..]
        )
    );

    let cards = result.server("c/html").unwrap().tools.as_ref().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "card_tool");
}

#[tokio::test]
async fn test_detail_timeout_is_an_extraction_error() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        json!({ "repositories": [listing_item("t/slow"), listing_item("t/fast")] }),
    )
    .await;
    mount_detail(
        &mock_server,
        "t/slow",
        html(tool_page(&["late"])).set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_detail(&mock_server, "t/fast", html(tool_page(&["quick"]))).await;

    let mut config = create_test_config(&mock_server.uri(), 2);
    config.fetch.request_timeout_secs = 1;
    config.fetch.connect_timeout_secs = 1;

    let scanner = Scanner::new(config).unwrap();
    let result = scanner.scan(true).await.expect("Scan failed");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].slug, "t/slow");
    assert!(result.server("t/slow").unwrap().tools.is_none());

    let fast = result.server("t/fast").unwrap().tools.as_ref().unwrap();
    assert_eq!(fast[0].name, "quick");
}
