//! Sleuth orchestrates research requests across multiple web search and scrape providers.
//!
//! Overview
//! - Routes each request through a priority-ordered list of providers that implement
//!   the `sleuth_core` contracts, falling back on any failure.
//! - Short-circuits through a persistent SQLite response cache keyed per provider,
//!   with TTLs chosen by the request's data type.
//! - Gates every network call through that provider's token-bucket rate limiter,
//!   which also caps concurrent in-flight calls.
//! - Never fails a request outright: the returned [`Report`] always carries a
//!   payload, the attempt log, and any non-fatal warnings.
//!
//! Key behaviors and trade-offs
//! - Sequential fallback: providers are tried strictly in order with no speculative
//!   fan-out. This spends quota economically at the cost of latency when early
//!   providers fail.
//! - Per-provider cache keys: a cached answer from a lower-priority provider is only
//!   used once the router reaches that provider in the order.
//! - Rate limits are local: a provider that cannot hand out a token within
//!   `rate_limit_timeout` is skipped for this request, not retried.
//! - Timeouts: each attempt is bounded by the operation timeout; an optional
//!   request deadline bounds the whole sequence.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use sleuth::{DataType, RequestOptions, Sleuth};
//!
//! let sleuth = Sleuth::builder()
//!     .with_connector(Arc::new(TavilyConnector::new(key)))
//!     .with_connector(Arc::new(ExaConnector::new(key)))
//!     .build()?;
//!
//! let report = sleuth
//!     .search(
//!         "who owns 1200 Main St",
//!         &RequestOptions::new().data_type(DataType::Ownership),
//!     )
//!     .await;
//! if report.response.success() {
//!     for hit in &report.response.results {
//!         println!("{} {}", hit.title, hit.url);
//!     }
//! } else {
//!     eprintln!("{}", report.response.error.unwrap_or_default());
//! }
//! ```
//!
//! See `sleuth/examples/` for runnable demonstrations backed by `sleuth-mock`.
#![warn(missing_docs)]

pub(crate) mod core;
mod registry;
mod router;

pub use core::{Sleuth, SleuthBuilder, tag_err};
pub use registry::ProviderRegistry;
pub use router::util::{failure_reason, summarize};
pub use router::{Outcome, RequestOptions};

pub use sleuth_middleware::{
    CacheEntry, RateLimitPermit, RateLimiter, RateLimiters, ResponseCache,
    create_default_limiters, create_limiters, make_key,
};

// Re-export core types for convenience
pub use sleuth_core::{
    Attempt, CacheConfig, CacheStats, DEFAULT_MAX_RESULTS, DataType, MONTH, Metadata, Operation,
    Payload, ProviderKey, ProviderQuota, RateLimiterStats, Report, ScrapeProvider, ScrapeRequest,
    ScrapeResult, SearchProvider, SearchRequest, SearchResponse, SearchResult, SleuthConfig,
    SleuthConnector, SleuthError, SleuthStats, default_quotas, default_ttls,
};
