//! Configuration types shared across the orchestrator and its shared resources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::connector::ProviderKey;
use crate::error::SleuthError;
use crate::operation::DataType;

/// Thirty days, the billing period used by the default quotas.
pub const MONTH: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Sustained and burst limits for a single provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderQuota {
    /// Maximum requests per period; also the token bucket capacity.
    pub max_requests: u64,
    /// Length of the refill period. Tokens refill at `max_requests / period`.
    pub period: Duration,
    /// Maximum simultaneous in-flight requests.
    pub max_concurrent: usize,
}

impl ProviderQuota {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(max_requests: u64, period: Duration, max_concurrent: usize) -> Self {
        Self {
            max_requests,
            period,
            max_concurrent,
        }
    }
}

impl Default for ProviderQuota {
    fn default() -> Self {
        Self::new(1000, MONTH, 3)
    }
}

/// Default quotas matching the free/starter tiers of the built-in providers.
#[must_use]
pub fn default_quotas() -> BTreeMap<String, ProviderQuota> {
    [
        (ProviderKey::TAVILY, ProviderQuota::new(1000, MONTH, 3)),
        (ProviderKey::EXA, ProviderQuota::new(1000, MONTH, 3)),
        (ProviderKey::FIRECRAWL, ProviderQuota::new(500, MONTH, 2)),
        // actors are expensive
        (ProviderKey::APIFY, ProviderQuota::new(100, MONTH, 1)),
    ]
    .into_iter()
    .map(|(k, q)| (k.to_string(), q))
    .collect()
}

/// Default TTL per data-type category.
#[must_use]
pub fn default_ttls() -> BTreeMap<String, Duration> {
    [
        ("ownership", Duration::from_secs(7 * 24 * 60 * 60)),
        ("market", Duration::from_secs(24 * 60 * 60)),
        ("news", Duration::from_secs(60 * 60)),
        ("general", Duration::from_secs(4 * 60 * 60)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Configuration for the persistent response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Database file location. `None` selects `<home>/.sleuth/research_cache.db`.
    pub path: Option<PathBuf>,
    /// TTL overrides keyed by data-type name. Merged over [`default_ttls`].
    pub ttls: BTreeMap<String, Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            ttls: default_ttls(),
        }
    }
}

impl CacheConfig {
    /// Return a copy with a single TTL overridden.
    #[must_use]
    pub fn with_ttl(mut self, data_type: impl Into<String>, ttl: Duration) -> Self {
        self.set_ttl(data_type, ttl);
        self
    }

    /// Override one TTL in place. The key is normalized like [`DataType::from`].
    pub fn set_ttl(&mut self, data_type: impl Into<String>, ttl: Duration) {
        self.ttls.insert(ttl_key(&data_type.into()), ttl);
    }

    /// Return a copy pointing at an explicit database file.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Effective TTL table: defaults overlaid with the configured overrides.
    #[must_use]
    pub fn effective_ttls(&self) -> BTreeMap<String, Duration> {
        let mut out = default_ttls();
        out.extend(self.ttls.iter().map(|(k, v)| (ttl_key(k), *v)));
        out
    }
}

/// Canonical TTL table key for a data-type name as written by the caller.
fn ttl_key(name: &str) -> String {
    DataType::from(name).as_str().to_string()
}

/// Global configuration for the `Sleuth` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleuthConfig {
    /// Provider try-order for searches.
    pub search_order: Vec<String>,
    /// Provider try-order for scrapes.
    pub scrape_order: Vec<String>,
    /// Per-provider quota. Providers without an entry are not rate limited.
    pub quotas: BTreeMap<String, ProviderQuota>,
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Default per-attempt timeout for searches.
    pub search_timeout: Duration,
    /// Default per-attempt timeout for scrapes.
    pub scrape_timeout: Duration,
    /// Budget for waiting on a rate-limiter token before falling back.
    pub rate_limit_timeout: Duration,
    /// Optional deadline covering the whole provider sequence of one request.
    pub request_timeout: Option<Duration>,
}

impl Default for SleuthConfig {
    fn default() -> Self {
        Self {
            search_order: vec![ProviderKey::TAVILY.into(), ProviderKey::EXA.into()],
            scrape_order: vec![ProviderKey::FIRECRAWL.into(), ProviderKey::APIFY.into()],
            quotas: default_quotas(),
            cache: CacheConfig::default(),
            search_timeout: Duration::from_secs(30),
            scrape_timeout: Duration::from_secs(60),
            rate_limit_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

impl SleuthConfig {
    /// Parse a configuration document. Omitted fields keep their defaults.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the document is not valid JSON for this schema.
    pub fn from_json_str(s: &str) -> Result<Self, SleuthError> {
        serde_json::from_str(s).map_err(|e| SleuthError::InvalidArg(format!("config: {e}")))
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SleuthError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SleuthError::InvalidArg(format!("config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }
}
