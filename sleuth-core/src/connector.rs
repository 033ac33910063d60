use async_trait::async_trait;

use crate::types::{ScrapeRequest, SearchRequest};
use sleuth_types::{ProviderKey, ScrapeResult, SearchResponse, SleuthError};

/// Focused role trait for providers that answer free-text web searches.
///
/// Implementations must be safe to call concurrently and should honor
/// `req.timeout`; the orchestrator additionally bounds every call with it.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a search and normalize the hits.
    ///
    /// A failed call returns a tagged [`SleuthError::Provider`] (with `retryable` and
    /// an optional status code) or [`SleuthError::ProviderTimeout`].
    async fn search(&self, req: SearchRequest) -> Result<SearchResponse, SleuthError>;
}

/// Focused role trait for providers that turn a URL into markdown.
#[async_trait]
pub trait ScrapeProvider: Send + Sync {
    /// Scrape one page.
    ///
    /// Blocked or empty pages may be reported either as an error or as a
    /// [`ScrapeResult`] with `success == false`; the orchestrator treats both as failures.
    async fn scrape(&self, req: ScrapeRequest) -> Result<ScrapeResult, SleuthError>;
}

/// The primary interface implemented by every provider client.
///
/// A connector advertises the operations it serves by returning trait object
/// references from the `as_*_provider` accessors.
#[async_trait]
pub trait SleuthConnector: Send + Sync {
    /// A stable identifier used in try-orders, quotas, and cache keys (e.g. "tavily").
    fn name(&self) -> &'static str;

    /// Canonical provider key constructed from the static name.
    fn key(&self) -> ProviderKey {
        ProviderKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Advertise search capability.
    fn as_search_provider(&self) -> Option<&dyn SearchProvider> {
        None
    }

    /// Advertise scrape capability.
    fn as_scrape_provider(&self) -> Option<&dyn ScrapeProvider> {
        None
    }
}
