use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the sleuth workspace.
///
/// This wraps provider-tagged failures, rate-limit rejections, storage issues from
/// the response cache, timeouts, and an aggregate for multi-provider attempts.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SleuthError {
    /// The requested operation is not implemented by the target connector.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// Operation label describing what was requested (e.g. "scrape").
        operation: String,
    },

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual provider reported a failure.
    #[error("{provider} error ({}): {message}", status_label(.status_code))]
    Provider {
        /// Provider name that failed.
        provider: String,
        /// Human-readable error message.
        message: String,
        /// HTTP status code, if the provider reported one.
        status_code: Option<u16>,
        /// Whether a later retry could reasonably succeed.
        retryable: bool,
    },

    /// An individual provider call exceeded the per-attempt timeout.
    #[error("provider timed out: {operation} via {provider}")]
    ProviderTimeout {
        /// Provider name that timed out.
        provider: String,
        /// Operation label ("search" or "scrape").
        operation: String,
    },

    /// The overall request exceeded its deadline.
    #[error("request timed out: {operation}")]
    RequestTimeout {
        /// Operation label for which the request timed out.
        operation: String,
    },

    /// A rate limiter could not hand out a token before its timeout elapsed.
    #[error("{provider}: rate limit exceeded (waited {waited_ms}ms for a token)")]
    RateLimitExceeded {
        /// Provider whose limiter rejected the request.
        provider: String,
        /// How long the caller waited before giving up.
        waited_ms: u64,
    },

    /// The response cache storage layer failed (I/O, corruption, locking).
    #[error("cache storage error: {0}")]
    Storage(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No configured provider can serve the operation.
    #[error("no {operation} providers available")]
    NoProviders {
        /// Operation label.
        operation: String,
    },

    /// All attempted providers failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<SleuthError>),
}

fn status_label(code: &Option<u16>) -> String {
    code.map_or_else(|| "None".to_string(), |c| c.to_string())
}

impl SleuthError {
    /// Helper: build an `Unsupported` error for an operation label.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Helper: build a non-retryable `Provider` error without a status code.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: None,
            retryable: false,
        }
    }

    /// Helper: build a `Provider` error from an HTTP status code.
    ///
    /// 429 and 5xx gateway-class statuses are considered retryable.
    pub fn provider_status(
        provider: impl Into<String>,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code: Some(status_code),
            retryable: matches!(status_code, 429 | 500 | 502 | 503 | 504),
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
            operation: operation.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(operation: impl Into<String>) -> Self {
        Self::RequestTimeout {
            operation: operation.into(),
        }
    }

    /// Helper: build a `RateLimitExceeded` error.
    pub fn rate_limited(provider: impl Into<String>, waited_ms: u64) -> Self {
        Self::RateLimitExceeded {
            provider: provider.into(),
            waited_ms,
        }
    }

    /// Helper: build a `Storage` error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether this failure is transient.
    ///
    /// Only used for diagnostics; the orchestrator falls back on every failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::ProviderTimeout { .. }
            | Self::RequestTimeout { .. }
            | Self::RateLimitExceeded { .. } => true,
            Self::AllProvidersFailed(inner) => inner.iter().any(Self::is_retryable),
            _ => false,
        }
    }

    /// HTTP status code attached to a provider failure, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    ///
    /// This preserves other error variants as-is and unwraps recursively.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

impl From<serde_json::Error> for SleuthError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
