//! Normalized result models shared by every provider.
//!
//! Connectors translate vendor payloads into these types so callers receive the
//! same structure regardless of which provider answered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form provider-specific fields that do not fit the common schema.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Short excerpt.
    pub snippet: String,
    /// Relevance in `[0.0, 1.0]`, normalized by the connector where possible.
    pub relevance_score: f64,
    /// Provider that produced the hit.
    pub source_api: String,
    /// Publication date, when the provider reports one.
    #[serde(default)]
    pub published_date: Option<String>,
    /// Full page content, when requested and available.
    #[serde(default)]
    pub raw_content: Option<String>,
    /// Additional provider-specific data.
    #[serde(default)]
    pub metadata: Metadata,
}

impl SearchResult {
    /// Build a hit with the required fields and empty optional ones.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        relevance_score: f64,
        source_api: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            source_api: source_api.into(),
            published_date: None,
            raw_content: None,
            metadata: Metadata::new(),
        }
    }
}

/// Aggregated response for one search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query as submitted.
    pub query: String,
    /// Normalized hits.
    pub results: Vec<SearchResult>,
    /// Provider that produced the hits, or `"none"` on total failure.
    pub source_api: String,
    /// True when served from the response cache.
    #[serde(default)]
    pub cached: bool,
    /// When the response was obtained.
    #[serde(default = "Utc::now")]
    pub retrieved_at: DateTime<Utc>,
    /// Failure summary; `None` on success.
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Successful response from a provider.
    pub fn new(
        query: impl Into<String>,
        results: Vec<SearchResult>,
        source_api: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            results,
            source_api: source_api.into(),
            cached: false,
            retrieved_at: Utc::now(),
            error: None,
        }
    }

    /// Empty response carrying a failure summary.
    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(query, Vec::new(), "none")
        }
    }

    /// True when the search returned at least one result and no error.
    #[must_use]
    pub fn success(&self) -> bool {
        self.error.is_none() && !self.results.is_empty()
    }

    /// Number of hits.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}

/// Markdown rendition of one scraped page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// The URL that was scraped.
    pub url: String,
    /// Page content converted to markdown.
    pub markdown: String,
    /// Page metadata (title, status code, language, ...).
    #[serde(default)]
    pub metadata: Metadata,
    /// Provider that produced the page.
    #[serde(default)]
    pub source_api: String,
    /// True when the scrape completed without errors.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Failure description, if any.
    #[serde(default)]
    pub error: Option<String>,
    /// True when served from the response cache.
    #[serde(default)]
    pub cached: bool,
}

const fn default_true() -> bool {
    true
}

impl ScrapeResult {
    /// Successful scrape.
    pub fn new(
        url: impl Into<String>,
        markdown: impl Into<String>,
        source_api: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            markdown: markdown.into(),
            metadata: Metadata::new(),
            source_api: source_api.into(),
            success: true,
            error: None,
            cached: false,
        }
    }

    /// Unsuccessful scrape with an explanation.
    pub fn failed(
        url: impl Into<String>,
        source_api: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::new(url, String::new(), source_api)
        }
    }
}
