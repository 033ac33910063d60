//! Deterministic canned payloads.

use sleuth_core::{ScrapeResult, SearchResult};

/// `n` hits for `query`, attributed to `provider`, with descending relevance.
#[must_use]
pub fn search_hits(provider: &str, query: &str, n: usize) -> Vec<SearchResult> {
    (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let score = 1.0 - (i as f64) * 0.1;
            let slug: String = query
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
                .collect();
            SearchResult::new(
                format!("{query} result {}", i + 1),
                format!("https://{provider}.example/{slug}/{}", i + 1),
                format!("Snippet {} for \"{query}\" from {provider}.", i + 1),
                score,
                provider,
            )
        })
        .collect()
}

/// A small markdown page for `url`.
#[must_use]
pub fn page(provider: &str, url: &str) -> ScrapeResult {
    let mut result = ScrapeResult::new(
        url,
        format!("# {url}\n\nScraped by {provider}.\n"),
        provider,
    );
    result
        .metadata
        .insert("status_code".into(), serde_json::Value::from(200));
    result
}
