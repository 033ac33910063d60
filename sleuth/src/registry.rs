//! Set of configured provider connectors, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use sleuth_core::SleuthConnector;

/// Connectors available to the orchestrator, keyed by [`SleuthConnector::name`].
///
/// Providers whose credentials are missing are simply never registered; the
/// orchestrator skips names it cannot find here.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    connectors: BTreeMap<&'static str, Arc<dyn SleuthConnector>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.connectors.keys()).finish()
    }
}

impl ProviderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connector, replacing any previous one with the same name.
    pub fn register(&mut self, connector: Arc<dyn SleuthConnector>) -> &mut Self {
        self.connectors.insert(connector.name(), connector);
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, connector: Arc<dyn SleuthConnector>) -> Self {
        self.register(connector);
        self
    }

    /// Register the connector produced by `factory` only when `credential` is present.
    ///
    /// Blank credentials count as missing. Returns whether a connector was added.
    pub fn register_if_configured<F>(
        &mut self,
        name: &str,
        credential: Option<String>,
        factory: F,
    ) -> bool
    where
        F: FnOnce(String) -> Arc<dyn SleuthConnector>,
    {
        match credential.filter(|c| !c.trim().is_empty()) {
            Some(credential) => {
                self.register(factory(credential));
                true
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    target: "sleuth::registry",
                    provider = name,
                    "no credential configured; provider disabled"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = name;
                false
            }
        }
    }

    /// Read a credential from an environment variable, treating blank values as absent.
    #[must_use]
    pub fn credential_from_env(var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Connector registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn SleuthConnector>> {
        self.connectors.get(name).cloned()
    }

    /// Whether `name` is configured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.connectors.contains_key(name)
    }

    /// Configured provider names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.connectors.keys().copied()
    }

    /// Number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// True when nothing is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
