//! Provider metadata types usable across crates.

/// Typed key for identifying providers in ordering and quota configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderKey(pub &'static str);

impl ProviderKey {
    /// General-purpose web search.
    pub const TAVILY: Self = Self("tavily");
    /// Semantic search.
    pub const EXA: Self = Self("exa");
    /// JavaScript-capable page scraping.
    pub const FIRECRAWL: Self = Self("firecrawl");
    /// Actor-based scraping workflows.
    pub const APIFY: Self = Self("apify");

    /// Construct a new typed provider key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<ProviderKey> for &'static str {
    fn from(k: ProviderKey) -> Self {
        k.0
    }
}

impl From<ProviderKey> for String {
    fn from(k: ProviderKey) -> Self {
        k.0.to_string()
    }
}

impl core::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}
