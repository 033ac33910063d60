//! Per-provider token bucket with a concurrency ceiling.
//!
//! Every [`RateLimiter::acquire`] first queues for a concurrency slot and then
//! withdraws one token, sleeping with a capped backoff while the bucket is empty.
//! Tokens are consumed; only the slot is returned when the permit drops.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sleuth_types::{ProviderQuota, RateLimiterStats, SleuthError, default_quotas};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::Instant;

const MIN_BACKOFF: Duration = Duration::from_millis(50);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn level_at(&self, now: Instant, max_tokens: f64, refill_rate: f64) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * refill_rate).min(max_tokens)
    }
}

/// Token bucket plus counting semaphore guarding one provider.
///
/// One instance per provider is shared by every in-flight request.
pub struct RateLimiter {
    provider: String,
    max_tokens: f64,
    refill_rate: f64,
    max_concurrent: usize,
    bucket: Mutex<Bucket>,
    slots: Semaphore,
    requests_made: AtomicU64,
    requests_throttled: AtomicU64,
    requests_rejected: AtomicU64,
}

/// Scoped admission handle; dropping it frees the concurrency slot.
#[must_use = "the concurrency slot is released as soon as the permit is dropped"]
pub struct RateLimitPermit<'a> {
    provider: &'a str,
    _slot: SemaphorePermit<'a>,
}

impl RateLimitPermit<'_> {
    /// Provider this permit was issued for.
    #[must_use]
    pub const fn provider(&self) -> &str {
        self.provider
    }
}

impl std::fmt::Debug for RateLimitPermit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitPermit")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Build a limiter with a full bucket.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the quota allows no requests, no concurrency, or
    /// has a zero-length period.
    pub fn new(provider: impl Into<String>, quota: ProviderQuota) -> Result<Self, SleuthError> {
        let provider = provider.into();
        if quota.max_requests == 0 || quota.max_concurrent == 0 || quota.period.is_zero() {
            return Err(SleuthError::InvalidArg(format!(
                "quota for {provider}: max_requests, max_concurrent and period must be non-zero"
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        let max_tokens = quota.max_requests as f64;
        Ok(Self {
            refill_rate: max_tokens / quota.period.as_secs_f64(),
            max_tokens,
            max_concurrent: quota.max_concurrent,
            bucket: Mutex::new(Bucket {
                tokens: max_tokens,
                last_refill: Instant::now(),
            }),
            slots: Semaphore::new(quota.max_concurrent),
            requests_made: AtomicU64::new(0),
            requests_throttled: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            provider,
        })
    }

    /// Provider this limiter guards.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Bucket capacity.
    #[must_use]
    pub const fn max_tokens(&self) -> f64 {
        self.max_tokens
    }

    /// Tokens added per second.
    #[must_use]
    pub const fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Concurrency ceiling.
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Wait for a concurrency slot, then for a token, up to `timeout` for the token.
    ///
    /// The slot wait itself only queues. If the token wait runs out, the slot is
    /// released before `RateLimitExceeded` is returned. Dropping the returned
    /// future at any point also releases a held slot.
    ///
    /// # Errors
    /// Returns `RateLimitExceeded` when no token became available in time.
    pub async fn acquire(&self, timeout: Duration) -> Result<RateLimitPermit<'_>, SleuthError> {
        let slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| SleuthError::rate_limited(&self.provider, 0))?;

        let started = Instant::now();
        // Unrepresentable deadlines wait for a token indefinitely.
        let deadline = started.checked_add(timeout);
        let mut waited = false;
        loop {
            let now = Instant::now();
            if self.try_take(now) {
                self.requests_made.fetch_add(1, Ordering::Relaxed);
                if waited {
                    self.requests_throttled.fetch_add(1, Ordering::Relaxed);
                }
                return Ok(RateLimitPermit {
                    provider: &self.provider,
                    _slot: slot,
                });
            }

            let remaining = deadline.map(|d| d.saturating_duration_since(now));
            if remaining.is_some_and(|r| r.is_zero()) {
                drop(slot);
                self.requests_rejected.fetch_add(1, Ordering::Relaxed);
                let waited_ms =
                    u64::try_from(now.duration_since(started).as_millis()).unwrap_or(u64::MAX);
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "sleuth::ratelimit",
                    provider = %self.provider,
                    waited_ms,
                    "rate limit exceeded"
                );
                return Err(SleuthError::rate_limited(&self.provider, waited_ms));
            }

            let pause = remaining.map_or(self.backoff(), |r| self.backoff().min(r));
            tokio::time::sleep(pause).await;
            waited = true;
        }
    }

    /// Best-effort bucket level with refill applied; does not mutate state.
    #[must_use]
    pub fn tokens_remaining(&self) -> f64 {
        let bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.level_at(Instant::now(), self.max_tokens, self.refill_rate)
    }

    /// Concurrency slots not currently held.
    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            provider: self.provider.clone(),
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_throttled: self.requests_throttled.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            tokens_remaining: self.tokens_remaining(),
            max_tokens: self.max_tokens,
            available_slots: self.available_slots(),
        }
    }

    fn try_take(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.tokens = bucket.level_at(now, self.max_tokens, self.refill_rate);
        bucket.last_refill = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn backoff(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.refill_rate)
            .unwrap_or(MAX_BACKOFF)
            .clamp(MIN_BACKOFF, MAX_BACKOFF)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("provider", &self.provider)
            .field("max_tokens", &self.max_tokens)
            .field("refill_rate", &self.refill_rate)
            .field("max_concurrent", &self.max_concurrent)
            .finish_non_exhaustive()
    }
}

/// Limiters keyed by provider name.
pub type RateLimiters = BTreeMap<String, Arc<RateLimiter>>;

/// Build one shared limiter per configured quota.
///
/// # Errors
/// Returns `InvalidArg` if any quota is degenerate.
pub fn create_limiters(
    quotas: &BTreeMap<String, ProviderQuota>,
) -> Result<RateLimiters, SleuthError> {
    quotas
        .iter()
        .map(|(name, quota)| Ok((name.clone(), Arc::new(RateLimiter::new(name, *quota)?))))
        .collect()
}

/// Limiters for the built-in providers using their default quotas.
///
/// # Errors
/// Never fails for the built-in table; the `Result` mirrors [`create_limiters`].
pub fn create_default_limiters() -> Result<RateLimiters, SleuthError> {
    create_limiters(&default_quotas())
}
