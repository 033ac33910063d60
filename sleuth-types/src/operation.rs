use core::fmt;
use serde::{Deserialize, Serialize};

/// Outbound operation kinds routed by the orchestrator.
///
/// These label errors, cache keys, and telemetry so that a search and a scrape of
/// the same string never share a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Free-text web search.
    Search,
    /// Fetch a single URL and convert it to markdown.
    Scrape,
}

impl Operation {
    /// Stable, lowercase identifier for logs, errors, and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Scrape => "scrape",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Freshness category attached to a request; selects the cache TTL bucket.
///
/// Unknown names parse into [`DataType::Custom`]; the cache resolves a custom name
/// against its TTL table and falls back to the `general` bucket when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    /// Property and ownership records; change rarely.
    Ownership,
    /// Market comps and pricing.
    Market,
    /// Perishable news coverage.
    News,
    /// Default bucket.
    #[default]
    General,
    /// Any other category name configured in the TTL table.
    Custom(String),
}

impl DataType {
    /// Canonical category name used as the TTL table key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ownership => "ownership",
            Self::Market => "market",
            Self::News => "news",
            Self::General => "general",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "ownership" => Self::Ownership,
            "market" => Self::Market,
            "news" => Self::News,
            "general" | "" => Self::General,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DataType> for String {
    fn from(d: DataType) -> Self {
        d.as_str().to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
