//! Web point extraction.
//!
//! Runs a web search for the question and condenses the raw result text into
//! a handful of clean factual sentences. Web results are supplementary: any
//! search failure turns into an empty point list, never an error.

use crate::config::WebSearchConfig;
use crate::rag::cache::PointCache;
use crate::types::WebPoints;
use campus_core::{AppError, AppResult};
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Section title used when rendering web points into a prompt or answer.
pub const WEB_POINTS_TITLE: &str = "Additional Web Information";

/// Web search capability: query in, raw result text out.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> AppResult<String>;
}

/// DuckDuckGo HTML search. Result snippets are joined into one text blob.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("campus-buddy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::WebSearch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait::async_trait]
impl WebSearch for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> AppResult<String> {
        tracing::debug!("Searching the web for: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| AppError::WebSearch(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::WebSearch(format!(
                "Search endpoint returned {}",
                status
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::WebSearch(format!("Failed to read search response: {}", e)))?;

        let text = snippets_from_html(&html)?;
        if text.trim().is_empty() {
            return Err(AppError::WebSearch(format!("No results for '{}'", query)));
        }

        Ok(text)
    }
}

/// Pull result snippets out of a DuckDuckGo HTML results page.
pub fn snippets_from_html(html: &str) -> AppResult<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse(".result__snippet")
        .map_err(|e| AppError::WebSearch(format!("Invalid snippet selector: {:?}", e)))?;

    let snippets: Vec<String> = document
        .select(&selector)
        .map(|element| element.text().collect::<Vec<_>>().join(""))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect();

    Ok(snippets.join(" "))
}

fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?;]\s+").expect("Invalid regex"))
}

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]").expect("Invalid regex"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"))
}

/// Split raw search text into clean factual sentences.
///
/// Keeps sentences within the configured length bounds that contain no
/// denylisted marker, with bracketed annotations removed. At most
/// `max_points` are returned, in original order.
pub fn extract_points(raw: &str, config: &WebSearchConfig) -> Vec<String> {
    let denylist: Vec<String> = config.denylist.iter().map(|m| m.to_lowercase()).collect();
    let within_bounds = |s: &str| {
        let len = s.chars().count();
        len >= config.min_point_chars && len <= config.max_point_chars
    };

    sentence_boundary()
        .split(raw)
        .map(str::trim)
        .filter(|candidate| within_bounds(candidate))
        .filter(|candidate| {
            let lower = candidate.to_lowercase();
            !denylist.iter().any(|marker| lower.contains(marker.as_str()))
        })
        .map(|candidate| {
            let stripped = bracketed().replace_all(candidate, "");
            whitespace_run().replace_all(&stripped, " ").trim().to_string()
        })
        .filter(|point| within_bounds(point))
        .take(config.max_points)
        .collect()
}

/// Render points as a titled check-mark list; empty input renders as "".
pub fn format_points(points: &[String], title: &str) -> String {
    if points.is_empty() {
        return String::new();
    }

    let mut formatted = format!("**{}:**\n", title);
    for point in points.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        formatted.push_str("✓ ");
        formatted.push_str(point);
        formatted.push('\n');
    }
    formatted
}

/// Web search plus point extraction, memoized per query.
pub struct WebPointExtractor {
    search: Arc<dyn WebSearch>,
    cache: PointCache,
    config: WebSearchConfig,
}

impl WebPointExtractor {
    pub fn new(search: Arc<dyn WebSearch>, config: WebSearchConfig) -> Self {
        let cache = PointCache::new(Duration::from_secs(config.cache_ttl_secs));
        Self {
            search,
            cache,
            config,
        }
    }

    /// DuckDuckGo-backed extractor for the given settings.
    pub fn duckduckgo(config: WebSearchConfig) -> AppResult<Self> {
        let search = DuckDuckGoSearch::new(config.endpoint.clone())?;
        Ok(Self::new(Arc::new(search), config))
    }

    pub fn cache(&self) -> &PointCache {
        &self.cache
    }

    /// Points for `query`. Never fails; search errors come back in
    /// `WebPoints::error` with no points. Only successful lookups are cached.
    pub async fn lookup(&self, query: &str) -> WebPoints {
        if let Some(points) = self.cache.get(query) {
            return WebPoints {
                points,
                raw: String::new(),
                error: None,
            };
        }

        match self.search.search(query).await {
            Ok(raw) if raw.trim().is_empty() => {
                tracing::warn!("Web search '{}' returned nothing", self.search.name());
                WebPoints::failed("Web search returned no results")
            }
            Ok(raw) => {
                let points = extract_points(&raw, &self.config);
                tracing::debug!("Extracted {} web points from {} bytes", points.len(), raw.len());
                self.cache.insert(query, points.clone());
                WebPoints {
                    points,
                    raw,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Web search failed, continuing without it: {}", e);
                WebPoints::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Search fake returning a fixed result, counting calls.
    pub(crate) struct FixedSearch {
        pub(crate) result: Result<String, String>,
        pub(crate) calls: AtomicUsize,
    }

    impl FixedSearch {
        pub(crate) fn ok(text: &str) -> Self {
            Self {
                result: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl WebSearch for FixedSearch {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(AppError::WebSearch)
        }
    }

    #[test]
    fn test_extract_points_filters_and_cleans() {
        let raw = "Short one. The campus gym is open from 6am to 11pm [1]. \
                   Click here to read the full schedule of events! \
                   Students   can borrow   equipment at the front desk; \
                   Sponsored: best laptops for students this year? \
                   Swimming lessons run every Tuesday evening.";
        let points = extract_points(raw, &WebSearchConfig::default());

        assert_eq!(
            points,
            vec![
                "The campus gym is open from 6am to 11pm".to_string(),
                "Students can borrow equipment at the front desk".to_string(),
                "Swimming lessons run every Tuesday evening.".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_points_length_bounds() {
        let long = "a".repeat(301);
        let raw = format!("Too short here. {}. Exactly fifteen. This one is just right.", long);
        let points = extract_points(&raw, &WebSearchConfig::default());

        assert!(points
            .iter()
            .all(|p| p.chars().count() >= 15 && p.chars().count() <= 300));
        assert_eq!(points, vec!["Exactly fifteen".to_string(), "This one is just right.".to_string()]);
    }

    #[test]
    fn test_extract_points_denylist_case_insensitive() {
        let raw = "READ MORE about the campus library hours. Advertisement for campus housing deals. \
                   The library has three floors of study space.";
        let points = extract_points(raw, &WebSearchConfig::default());
        assert_eq!(points, vec!["The library has three floors of study space.".to_string()]);
    }

    #[test]
    fn test_extract_points_caps_at_five() {
        let raw = (1..=12)
            .map(|i| format!("Campus fact number {} is worth knowing", i))
            .collect::<Vec<_>>()
            .join(". ");
        let points = extract_points(&raw, &WebSearchConfig::default());

        assert_eq!(points.len(), 5);
        assert_eq!(points[0], "Campus fact number 1 is worth knowing");
        assert_eq!(points[4], "Campus fact number 5 is worth knowing");
    }

    #[test]
    fn test_bracket_removal_rechecks_length() {
        // Long enough before cleaning, too short after
        let raw = "Gym [citation needed here]. The dining hall serves breakfast.";
        let points = extract_points(raw, &WebSearchConfig::default());
        assert_eq!(points, vec!["The dining hall serves breakfast.".to_string()]);
    }

    #[test]
    fn test_format_points() {
        let points = vec!["Gym opens at 6am".to_string(), "Pool closes at 9pm".to_string()];
        assert_eq!(
            format_points(&points, WEB_POINTS_TITLE),
            "**Additional Web Information:**\n✓ Gym opens at 6am\n✓ Pool closes at 9pm\n"
        );
        assert_eq!(format_points(&[], WEB_POINTS_TITLE), "");
    }

    #[test]
    fn test_snippets_from_html() {
        let html = r#"<html><body>
            <div class="result"><a class="result__snippet">The campus gym   is open late.</a></div>
            <div class="result"><a class="result__snippet">Pool <b>hours</b> vary by term.</a></div>
            <div class="other">ignored text</div>
        </body></html>"#;

        let text = snippets_from_html(html).unwrap();
        assert_eq!(text, "The campus gym is open late. Pool hours vary by term.");
    }

    #[tokio::test]
    async fn test_lookup_caches_success() {
        let search = Arc::new(FixedSearch::ok(
            "The campus gym is open from 6am to 11pm. Pool hours vary by term.",
        ));
        let extractor = WebPointExtractor::new(search.clone(), WebSearchConfig::default());

        let first = extractor.lookup("campus gym").await;
        let second = extractor.lookup("campus gym").await;

        assert_eq!(first.points.len(), 2);
        assert_eq!(first.points, second.points);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_soft_and_not_cached() {
        let search = Arc::new(FixedSearch::failing("network unreachable"));
        let extractor = WebPointExtractor::new(search.clone(), WebSearchConfig::default());

        let result = extractor.lookup("campus sports").await;
        assert!(result.points.is_empty());
        assert!(result.error.unwrap().contains("network unreachable"));

        extractor.lookup("campus sports").await;
        assert_eq!(search.calls.load(Ordering::SeqCst), 2);
        assert!(extractor.cache().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_empty_result_is_soft_failure() {
        let search = Arc::new(FixedSearch::ok("   "));
        let extractor = WebPointExtractor::new(search, WebSearchConfig::default());

        let result = extractor.lookup("anything").await;
        assert!(result.points.is_empty());
        assert!(result.error.is_some());
        assert!(extractor.cache().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_soft_failure() {
        let config = WebSearchConfig {
            endpoint: "http://127.0.0.1:1/html/".to_string(),
            ..Default::default()
        };
        let extractor = WebPointExtractor::duckduckgo(config).unwrap();

        let result = extractor.lookup("campus sports").await;
        assert!(result.points.is_empty());
        assert!(result.error.is_some());
    }
}
