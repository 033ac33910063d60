//! Counter snapshots for diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot of one provider's rate limiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimiterStats {
    /// Provider this limiter guards.
    pub provider: String,
    /// Requests that obtained a permit.
    pub requests_made: u64,
    /// Requests that had to wait for a token refill before being admitted.
    pub requests_throttled: u64,
    /// Requests that gave up waiting for a token.
    pub requests_rejected: u64,
    /// Approximate tokens left right now.
    pub tokens_remaining: f64,
    /// Bucket capacity.
    pub max_tokens: f64,
    /// Concurrency slots currently free.
    pub available_slots: usize,
}

/// Snapshot of response cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired).
    pub misses: u64,
    /// Entries written.
    pub stores: u64,
    /// Expired entries removed, lazily or by sweep.
    pub evictions: u64,
    /// Rows currently stored.
    pub total_entries: u64,
}

/// Combined snapshot of the orchestrator and its shared resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleuthStats {
    /// Per-provider limiter stats.
    pub rate_limiters: BTreeMap<String, RateLimiterStats>,
    /// Cache usage.
    pub cache: CacheStats,
    /// Answers produced by a provider other than the first candidate.
    pub fallbacks_used: u64,
    /// Search requests handled.
    pub total_searches: u64,
    /// Scrape requests handled.
    pub total_scrapes: u64,
}
