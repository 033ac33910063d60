//! sleuth-middleware
//!
//! Process-wide resources shared by every orchestrated request:
//!
//! - [`RateLimiter`]: per-provider token bucket with a concurrency ceiling.
//! - [`ResponseCache`]: SQLite-backed response cache with per-data-type TTLs.
//!
//! Both are cheap to share behind an `Arc` (the cache handle is itself `Clone`)
//! and safe to use from many tasks at once.
#![warn(missing_docs)]

mod cache;
mod ratelimit;

pub use crate::cache::{CacheEntry, ResponseCache, make_key};
pub use crate::ratelimit::{
    RateLimitPermit, RateLimiter, RateLimiters, create_default_limiters, create_limiters,
};
