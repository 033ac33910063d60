//! Sleuth-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod config;
mod connector;
mod error;
mod models;
mod operation;
mod reports;
mod stats;

pub use config::{
    CacheConfig, MONTH, ProviderQuota, SleuthConfig, default_quotas, default_ttls,
};
pub use connector::ProviderKey;
pub use error::SleuthError;
pub use models::{Metadata, ScrapeResult, SearchResponse, SearchResult};
pub use operation::{DataType, Operation};
pub use reports::{Attempt, Report};
pub use stats::{CacheStats, RateLimiterStats, SleuthStats};
