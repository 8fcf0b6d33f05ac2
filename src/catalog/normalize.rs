use crate::catalog::types::{AuthKind, Language, MarketplaceServer};
use crate::config::MarketplaceConfig;
use crate::NormalizeError;
use serde_json::{Map, Value};

/// Publisher used when a slug carries no `publisher/` prefix
pub const UNKNOWN_PUBLISHER: &str = "unknown";

/// Explicit repository link fields consulted when `git_slug` is absent, in order
const URL_FIELDS: &[&str] = &["github_url", "repository_url", "repo_url", "url"];

/// Base URLs needed to turn listing references into absolute links
#[derive(Debug, Clone)]
pub struct CatalogUrls {
    pub detail_base_url: String,
    pub github_base_url: String,
}

impl CatalogUrls {
    pub fn from_config(config: &MarketplaceConfig) -> Self {
        Self {
            detail_base_url: config.detail_base_url.trim_end_matches('/').to_string(),
            github_base_url: config.github_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn marketplace_url(&self, slug: &str) -> String {
        format!("{}/{}", self.detail_base_url, slug)
    }

    fn github_url(&self, git_slug: &str) -> String {
        format!("{}/{}", self.github_base_url, git_slug.trim_matches('/'))
    }
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self::from_config(&MarketplaceConfig::default())
    }
}

/// Normalizes one raw listing item into a [`MarketplaceServer`]
///
/// # Rules
///
/// - `slug` is required; `publisher/name` is split at the first `/`, and a
///   slug without `/` gets publisher `unknown` with the slug as name
/// - `github_url` prefers `git_slug`, then the first explicit URL field
/// - `description` falls back to `subtitle`
/// - `language` comes from `tags.language`, then top-level `language`
/// - `auth` resolves `tags.auth` flags with precedence api_key > oauth > none
/// - `heat_score` is clamped to [0, 100]; negative upvote counts are dropped
///
/// Every other field is optional and never causes a failure.
///
/// # Example
///
/// ```
/// use marketplace_scout::catalog::{normalize, CatalogUrls};
/// use serde_json::json;
///
/// let server = normalize(&json!({"slug": "acme/foo"}), &CatalogUrls::default()).unwrap();
/// assert_eq!(server.publisher, "acme");
/// assert_eq!(server.name, "foo");
/// ```
pub fn normalize(raw: &Value, urls: &CatalogUrls) -> Result<MarketplaceServer, NormalizeError> {
    let item = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let slug = non_blank_str(item.get("slug")).ok_or(NormalizeError::MissingSlug)?;
    let (publisher, name) = split_slug(&slug);

    let tags = item.get("tags").and_then(Value::as_object);

    let language = tags
        .and_then(|t| non_blank_str(t.get("language")))
        .or_else(|| non_blank_str(item.get("language")))
        .map(|tag| Language::from_tag(&tag))
        .unwrap_or(Language::Unknown);

    let description =
        non_blank_str(item.get("description")).or_else(|| non_blank_str(item.get("subtitle")));

    Ok(MarketplaceServer {
        marketplace_url: urls.marketplace_url(&slug),
        github_url: derive_github_url(item, urls),
        title: non_blank_str(item.get("title")),
        description,
        language,
        heat_score: item.get("heat_score").and_then(parse_heat_score),
        upvote_count: item.get("upvote_count").and_then(parse_upvote_count),
        auth: derive_auth(tags),
        verified: tags
            .and_then(|t| t.get("verified"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        use_cases: tags.map(collect_use_cases).unwrap_or_default(),
        tools: None,
        slug,
        publisher,
        name,
    })
}

/// Normalizes every item, skipping the ones that cannot be normalized
///
/// Returns the servers in input order and the number of skipped items.
pub fn normalize_all(items: &[Value], urls: &CatalogUrls) -> (Vec<MarketplaceServer>, usize) {
    let mut servers = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, raw) in items.iter().enumerate() {
        match normalize(raw, urls) {
            Ok(server) => servers.push(server),
            Err(e) => {
                tracing::warn!("Skipping listing item {}: {}", index, e);
                skipped += 1;
            }
        }
    }

    (servers, skipped)
}

/// Splits a slug into `(publisher, name)`
pub fn split_slug(slug: &str) -> (String, String) {
    match slug.split_once('/') {
        Some((publisher, name)) => {
            let publisher = if publisher.trim().is_empty() {
                UNKNOWN_PUBLISHER
            } else {
                publisher
            };
            let name = if name.is_empty() { slug } else { name };
            (publisher.to_string(), name.to_string())
        }
        None => (UNKNOWN_PUBLISHER.to_string(), slug.to_string()),
    }
}

fn derive_github_url(item: &Map<String, Value>, urls: &CatalogUrls) -> Option<String> {
    if let Some(git_slug) = non_blank_str(item.get("git_slug")) {
        return Some(urls.github_url(&git_slug));
    }

    URL_FIELDS
        .iter()
        .find_map(|field| non_blank_str(item.get(*field)))
}

fn derive_auth(tags: Option<&Map<String, Value>>) -> AuthKind {
    let Some(auth) = tags.and_then(|t| t.get("auth")).and_then(Value::as_object) else {
        return AuthKind::Unknown;
    };

    let flag = |key: &str| auth.get(key).and_then(Value::as_bool).unwrap_or(false);
    AuthKind::from_flags(flag("api_key"), flag("oauth"), flag("none"))
}

fn collect_use_cases(tags: &Map<String, Value>) -> Vec<String> {
    let mut use_cases: Vec<String> = tags
        .get("use_cases")
        .and_then(Value::as_object)
        .map(|cases| {
            cases
                .iter()
                .filter(|(_, enabled)| enabled.as_bool() == Some(true))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default();
    use_cases.sort();
    use_cases
}

fn parse_heat_score(value: &Value) -> Option<u8> {
    if let Some(n) = value.as_u64() {
        return Some(n.min(100) as u8);
    }
    if value.as_i64().is_some() {
        // Only negative integers reach this point
        return Some(0);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.clamp(0.0, 100.0) as u8)
}

fn parse_upvote_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f as u64)
}

/// Returns the trimmed string value, treating non-strings and blanks as absent
fn non_blank_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
