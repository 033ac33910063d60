//! Request types plus re-exports of foundational types from `sleuth-types`.
// Consolidated re-exports so downstream crates can depend on `sleuth-core` only

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use sleuth_types::{
    Attempt, CacheConfig, CacheStats, DataType, MONTH, Metadata, Operation, ProviderKey,
    ProviderQuota, RateLimiterStats, Report, ScrapeResult, SearchResponse, SearchResult,
    SleuthConfig, SleuthError, SleuthStats, default_quotas, default_ttls,
};

/// Default number of hits requested from a search provider.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Parameters handed to a [`SearchProvider`](crate::connector::SearchProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query.
    pub query: String,
    /// Upper bound on returned hits.
    pub max_results: usize,
    /// Time the provider may spend on this call.
    pub timeout: Duration,
}

impl SearchRequest {
    /// Request with default result count and a 30s timeout.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the result cap.
    #[must_use]
    pub const fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Parameters handed to a [`ScrapeProvider`](crate::connector::ScrapeProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Page to fetch.
    pub url: String,
    /// Time the provider may spend on this call.
    pub timeout: Duration,
}

impl ScrapeRequest {
    /// Request with a 60s timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
