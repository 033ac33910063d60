use std::time::Duration;

use serde::{Deserialize, Serialize};
use sleuth_core::{
    Attempt, DEFAULT_MAX_RESULTS, DataType, Operation, Report, ScrapeResult, SearchResponse,
};

use crate::Sleuth;

pub mod scrape;
pub mod search;
pub mod util;

/// Per-request knobs shared by search and scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Freshness category selecting the cache TTL.
    pub data_type: DataType,
    /// Provider to try before the default order.
    pub preferred: Option<String>,
    /// Per-attempt timeout; `None` uses the configured default for the operation.
    pub timeout: Option<Duration>,
    /// Upper bound on search hits. Ignored by scrapes.
    pub max_results: usize,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            data_type: DataType::General,
            preferred: None,
            timeout: None,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl RequestOptions {
    /// Defaults: general data, default order and timeouts, five search hits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data type.
    #[must_use]
    pub fn data_type(mut self, data_type: impl Into<DataType>) -> Self {
        self.data_type = data_type.into();
        self
    }

    /// Try `provider` first.
    #[must_use]
    pub fn prefer(mut self, provider: impl Into<String>) -> Self {
        self.preferred = Some(provider.into());
        self
    }

    /// Override the per-attempt timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cap the number of search hits.
    #[must_use]
    pub const fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }
}

/// Result of [`Sleuth::execute`], tagged by operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Outcome {
    /// Search report.
    Search(Report<SearchResponse>),
    /// Scrape report.
    Scrape(Report<ScrapeResult>),
}

impl Outcome {
    /// Operation that produced this outcome.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Search(_) => Operation::Search,
            Self::Scrape(_) => Operation::Scrape,
        }
    }

    /// True when some provider (or the cache) produced a usable answer.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Search(r) => r.response.success(),
            Self::Scrape(r) => r.response.success && r.response.error.is_none(),
        }
    }

    /// Aggregated failure summary, if the request failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Search(r) => r.response.error.as_deref(),
            Self::Scrape(r) => r.response.error.as_deref(),
        }
    }

    /// Candidates in the order they were tried.
    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Self::Search(r) => &r.attempts,
            Self::Scrape(r) => &r.attempts,
        }
    }
}

impl Sleuth {
    /// Run `op` against `target` (a query or URL) through cache, limiter, and fallback.
    ///
    /// Equivalent to calling [`search`](Self::search) or [`scrape`](Self::scrape);
    /// useful when the operation is chosen at runtime.
    pub async fn execute(&self, op: Operation, target: &str, opts: &RequestOptions) -> Outcome {
        match op {
            Operation::Search => Outcome::Search(self.search(target, opts).await),
            Operation::Scrape => Outcome::Scrape(self.scrape(target, opts).await),
        }
    }
}
