use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use sleuth_core::{
    Attempt, DataType, Operation, Payload, ProviderQuota, Report, SleuthConfig, SleuthConnector,
    SleuthError, SleuthStats,
};
use sleuth_middleware::{
    CacheEntry, RateLimiter, RateLimiters, ResponseCache, create_limiters, make_key,
};

use crate::registry::ProviderRegistry;
use crate::router::RequestOptions;
use crate::router::util::{failure_reason, summarize};

#[derive(Default)]
pub(crate) struct Counters {
    pub(crate) fallbacks_used: AtomicU64,
    pub(crate) total_searches: AtomicU64,
    pub(crate) total_scrapes: AtomicU64,
}

impl Counters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Orchestrator that serves searches and scrapes from the cache or from the
/// first configured provider that succeeds.
pub struct Sleuth {
    pub(crate) registry: ProviderRegistry,
    pub(crate) cfg: SleuthConfig,
    pub(crate) limiters: RateLimiters,
    pub(crate) cache: ResponseCache,
    pub(crate) counters: Counters,
}

impl std::fmt::Debug for Sleuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sleuth")
            .field("providers", &self.registry)
            .field("search_order", &self.cfg.search_order)
            .field("scrape_order", &self.cfg.scrape_order)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Sleuth`] orchestrator.
pub struct SleuthBuilder {
    registry: ProviderRegistry,
    cfg: SleuthConfig,
    cache: Option<ResponseCache>,
    limiters: Option<RateLimiters>,
}

impl Default for SleuthBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SleuthBuilder {
    /// Create a builder with default configuration and no providers.
    ///
    /// Behavior and trade-offs:
    /// - Default try-orders are `[tavily, exa]` for search and `[firecrawl, apify]`
    ///   for scrape; names without a registered connector are skipped at request time.
    /// - The cache opens `<home>/.sleuth/research_cache.db` unless a path or an
    ///   existing [`ResponseCache`] is supplied.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ProviderRegistry::new(),
            cfg: SleuthConfig::default(),
            cache: None,
            limiters: None,
        }
    }

    /// Register a provider connector.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn SleuthConnector>) -> Self {
        self.registry.register(c);
        self
    }

    /// Replace the provider registry wholesale.
    #[must_use]
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the whole configuration (orders, quotas, cache, timeouts).
    #[must_use]
    pub fn config(mut self, cfg: SleuthConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Default provider order for searches.
    #[must_use]
    pub fn search_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.search_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Default provider order for scrapes.
    #[must_use]
    pub fn scrape_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cfg.scrape_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Set or replace one provider's quota.
    ///
    /// Providers without a quota are not rate limited at all.
    #[must_use]
    pub fn quota(mut self, provider: impl Into<String>, quota: ProviderQuota) -> Self {
        self.cfg.quotas.insert(provider.into(), quota);
        self
    }

    /// Remove every quota, leaving all providers unthrottled.
    #[must_use]
    pub fn without_quotas(mut self) -> Self {
        self.cfg.quotas.clear();
        self
    }

    /// Place the cache database at `path`.
    #[must_use]
    pub fn cache_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.cfg.cache.path = Some(path.into());
        self
    }

    /// Override the TTL of one data type.
    #[must_use]
    pub fn ttl(mut self, data_type: impl Into<String>, ttl: Duration) -> Self {
        self.cfg.cache.set_ttl(data_type, ttl);
        self
    }

    /// Use an already-open cache, typically shared with another orchestrator.
    #[must_use]
    pub fn cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use existing limiters instead of creating them from the configured quotas.
    ///
    /// Behavior and trade-offs:
    /// - Limiters are process-wide singletons per provider; share the same map
    ///   between orchestrators that talk to the same accounts.
    #[must_use]
    pub fn limiters(mut self, limiters: RateLimiters) -> Self {
        self.limiters = Some(limiters);
        self
    }

    /// Default per-attempt timeout for searches.
    #[must_use]
    pub const fn search_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.search_timeout = timeout;
        self
    }

    /// Default per-attempt timeout for scrapes.
    #[must_use]
    pub const fn scrape_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.scrape_timeout = timeout;
        self
    }

    /// How long one attempt may wait for a rate-limiter token before falling back.
    #[must_use]
    pub const fn rate_limit_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.rate_limit_timeout = timeout;
        self
    }

    /// Deadline for the whole provider sequence of one request.
    ///
    /// Behavior and trade-offs:
    /// - Bounds total latency when several providers stall in turn.
    /// - Each attempt is cut short at the deadline; remaining candidates are not tried.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Build the orchestrator, opening the cache and creating limiters as needed.
    ///
    /// An empty registry is allowed; every request then reports that no providers
    /// are available.
    ///
    /// # Errors
    /// Returns `InvalidArg` for zero timeouts or degenerate quotas and `Storage`
    /// when the cache cannot be opened.
    pub fn build(self) -> Result<Sleuth, SleuthError> {
        if self.cfg.search_timeout.is_zero() || self.cfg.scrape_timeout.is_zero() {
            return Err(SleuthError::InvalidArg(
                "search_timeout and scrape_timeout must be non-zero".to_string(),
            ));
        }

        let limiters = match self.limiters {
            Some(l) => l,
            None => create_limiters(&self.cfg.quotas)?,
        };
        let cache = match self.cache {
            Some(c) => c,
            None => ResponseCache::open(&self.cfg.cache)?,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "sleuth::core",
            providers = ?self.registry,
            limited = limiters.len(),
            "orchestrator built"
        );

        Ok(Sleuth {
            registry: self.registry,
            cfg: self.cfg,
            limiters,
            cache,
            counters: Counters::default(),
        })
    }
}

/// Attribute an error to `provider` unless it already names one.
pub fn tag_err(provider: &str, e: SleuthError) -> SleuthError {
    match e {
        e @ (SleuthError::Provider { .. }
        | SleuthError::ProviderTimeout { .. }
        | SleuthError::RequestTimeout { .. }
        | SleuthError::RateLimitExceeded { .. }) => e,
        other => SleuthError::Provider {
            provider: provider.to_string(),
            retryable: other.is_retryable(),
            message: other.to_string(),
            status_code: None,
        },
    }
}

impl Sleuth {
    /// Start building a new `Sleuth` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use sleuth::Sleuth;
    ///
    /// let sleuth = Sleuth::builder()
    ///     .with_connector(Arc::new(TavilyConnector::new(key)))
    ///     .with_connector(Arc::new(ExaConnector::new(key)))
    ///     .cache_path("/var/cache/sleuth.db")
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> SleuthBuilder {
        SleuthBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &SleuthConfig {
        &self.cfg
    }

    /// Configured providers.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Shared response cache.
    #[must_use]
    pub const fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Limiter guarding `provider`, if it has a quota.
    #[must_use]
    pub fn limiter(&self, provider: &str) -> Option<&Arc<RateLimiter>> {
        self.limiters.get(provider)
    }

    /// All limiters, keyed by provider.
    #[must_use]
    pub const fn limiters(&self) -> &RateLimiters {
        &self.limiters
    }

    /// Candidate order for `op`: `preferred` first, then the default order without duplicates.
    ///
    /// Names are returned whether or not a connector is registered for them.
    #[must_use]
    pub fn try_order(&self, op: Operation, preferred: Option<&str>) -> Vec<String> {
        let defaults = match op {
            Operation::Search => &self.cfg.search_order,
            Operation::Scrape => &self.cfg.scrape_order,
        };
        let mut out: Vec<String> = Vec::with_capacity(defaults.len() + 1);
        for name in preferred.into_iter().chain(defaults.iter().map(String::as_str)) {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        out
    }

    /// Snapshot of limiter, cache, and orchestration counters.
    ///
    /// # Errors
    /// Returns `Storage` if the cache row count cannot be read.
    pub async fn stats(&self) -> Result<SleuthStats, SleuthError> {
        Ok(SleuthStats {
            rate_limiters: self
                .limiters
                .iter()
                .map(|(name, l)| (name.clone(), l.stats()))
                .collect(),
            cache: self.cache.stats().await?,
            fallbacks_used: self.counters.fallbacks_used.load(Ordering::Relaxed),
            total_searches: self.counters.total_searches.load(Ordering::Relaxed),
            total_scrapes: self.counters.total_scrapes.load(Ordering::Relaxed),
        })
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sleuth::core::provider_call_with_timeout",
            skip(fut),
            fields(
                provider = provider,
                operation = %op,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        provider: &str,
        op: Operation,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, SleuthError>
    where
        Fut: core::future::Future<Output = Result<T, SleuthError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(SleuthError::provider_timeout(provider, op.as_str())))
    }
}

impl Sleuth {
    /// Try candidates in order until one answers from the cache or succeeds.
    ///
    /// - Candidates without a registered connector, or whose connector lacks the
    ///   capability (`call` returns `None`), are skipped and never counted as tried.
    /// - Any failure (rate limit, provider error, timeout, unsuccessful payload)
    ///   advances to the next candidate; the same provider is never retried.
    /// - Never fails: exhaustion yields `P::exhausted` with every reason joined by `" | "`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sleuth::core::route",
            skip(self, target, opts, call),
            fields(operation = %P::OPERATION, query = %target),
        )
    )]
    pub(crate) async fn route<P, F, Fut>(
        &self,
        target: &str,
        opts: &RequestOptions,
        attempt_timeout: Duration,
        call: F,
    ) -> Report<P>
    where
        P: Payload,
        F: Fn(Arc<dyn SleuthConnector>, Duration) -> Option<Fut>,
        Fut: core::future::Future<Output = Result<P, SleuthError>> + Send,
    {
        let op = P::OPERATION;
        let deadline = self
            .cfg
            .request_timeout
            .and_then(|d| tokio::time::Instant::now().checked_add(d));
        let mut attempts: Vec<Attempt> = Vec::new();
        let mut warnings: Vec<SleuthError> = Vec::new();
        let mut reasons: Vec<String> = Vec::new();

        for name in self.try_order(op, opts.preferred.as_deref()) {
            let Some(c) = self.registry.get(&name) else {
                continue;
            };
            let Some(fut) = call(c.clone(), attempt_timeout) else {
                continue;
            };
            let fallback = !attempts.is_empty();

            let attempt = self.attempt(
                c.name(),
                target,
                &opts.data_type,
                attempt_timeout,
                fut,
                &mut warnings,
            );
            let outcome = match deadline {
                Some(at) => tokio::time::timeout_at(at, attempt)
                    .await
                    .unwrap_or_else(|_| Err(SleuthError::request_timeout(op.as_str()))),
                None => attempt.await,
            };

            match outcome {
                Ok((payload, cached)) => {
                    if !cached && fallback {
                        Counters::bump(&self.counters.fallbacks_used);
                        #[cfg(feature = "tracing")]
                        tracing::info!(
                            target: "sleuth::core",
                            provider = %name,
                            failed = reasons.len(),
                            "fallback provider succeeded"
                        );
                    }
                    attempts.push(Attempt {
                        provider: name,
                        cached,
                        fallback,
                        error: None,
                    });
                    return Report {
                        response: payload,
                        attempts,
                        warnings,
                    };
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        target: "sleuth::core",
                        provider = %name,
                        retryable = e.is_retryable(),
                        status_code = ?e.status_code(),
                        error = %e,
                        "provider attempt failed"
                    );
                    let stop = matches!(e, SleuthError::RequestTimeout { .. });
                    reasons.push(format!("{name}: {}", failure_reason(&e)));
                    attempts.push(Attempt {
                        provider: name,
                        cached: false,
                        fallback,
                        error: Some(e),
                    });
                    if stop {
                        break;
                    }
                }
            }
        }

        let summary = if attempts.is_empty() {
            SleuthError::NoProviders {
                operation: op.to_string(),
            }
            .to_string()
        } else {
            summarize(&reasons)
        };
        #[cfg(feature = "tracing")]
        tracing::error!(
            target: "sleuth::core",
            operation = %op,
            attempted = attempts.len(),
            summary = %summary,
            "all providers exhausted"
        );

        Report {
            response: P::exhausted(target, summary),
            attempts,
            warnings,
        }
    }

    /// One candidate: cache lookup, rate gate, provider call, cache write.
    ///
    /// Returns the payload and whether it came from the cache. Cache failures are
    /// pushed to `warnings` and never fail the attempt.
    async fn attempt<P, Fut>(
        &self,
        provider: &'static str,
        target: &str,
        data_type: &DataType,
        timeout: Duration,
        fut: Fut,
        warnings: &mut Vec<SleuthError>,
    ) -> Result<(P, bool), SleuthError>
    where
        P: Payload,
        Fut: core::future::Future<Output = Result<P, SleuthError>> + Send,
    {
        let op = P::OPERATION;
        let key = make_key(provider, op, target);

        match self.cache.get::<P>(&key).await {
            Ok(Some(mut hit)) => {
                hit.mark_cached();
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "sleuth::core", provider, "cache hit");
                return Ok((hit, true));
            }
            Ok(None) => {}
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "sleuth::core",
                    provider,
                    error = %e,
                    "cache read failed; treating as miss"
                );
                warnings.push(e);
            }
        }

        let permit = match self.limiters.get(provider) {
            Some(limiter) => Some(limiter.acquire(self.cfg.rate_limit_timeout).await?),
            None => None,
        };
        let payload = Self::provider_call_with_timeout(provider, op, timeout, fut)
            .await
            .map_err(|e| tag_err(provider, e))?;
        drop(permit);

        if !payload.is_success() {
            return Err(SleuthError::provider(provider, payload.failure_reason()));
        }

        let entry = CacheEntry::new(provider, op, target, data_type.clone());
        if let Err(e) = self.cache.put(&key, &payload, entry).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "sleuth::core", provider, error = %e, "cache write failed");
            warnings.push(e);
        }
        Ok((payload, false))
    }
}
