//! Uniform view over the result types the orchestrator moves through the cache.

use serde::Serialize;
use serde::de::DeserializeOwned;

use sleuth_types::{Operation, ScrapeResult, SearchResponse};

/// A provider result that can be cached, judged, and synthesized on failure.
pub trait Payload: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Operation that produces this payload; part of every cache key.
    const OPERATION: Operation;

    /// Whether the provider actually delivered usable content.
    fn is_success(&self) -> bool;

    /// Reason reported when [`is_success`](Self::is_success) is false.
    fn failure_reason(&self) -> String;

    /// Flag the payload as served from the cache.
    fn mark_cached(&mut self);

    /// Empty payload returned once every candidate has failed.
    fn exhausted(target: &str, summary: String) -> Self;
}

impl Payload for SearchResponse {
    const OPERATION: Operation = Operation::Search;

    fn is_success(&self) -> bool {
        self.success()
    }

    fn failure_reason(&self) -> String {
        match &self.error {
            Some(e) => format!("search returned error: {e}"),
            None => "search returned no results".to_string(),
        }
    }

    fn mark_cached(&mut self) {
        self.cached = true;
    }

    fn exhausted(target: &str, summary: String) -> Self {
        Self::failed(target, summary)
    }
}

impl Payload for ScrapeResult {
    const OPERATION: Operation = Operation::Scrape;

    fn is_success(&self) -> bool {
        self.success && self.error.is_none()
    }

    fn failure_reason(&self) -> String {
        format!(
            "scrape returned error: {}",
            self.error.as_deref().unwrap_or("unknown")
        )
    }

    fn mark_cached(&mut self) {
        self.cached = true;
    }

    fn exhausted(target: &str, summary: String) -> Self {
        Self::failed(target, "none", summary)
    }
}
