//! Report envelopes produced by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::SleuthError;

/// One candidate provider considered while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Provider that was tried.
    pub provider: String,
    /// True when the answer came from the response cache.
    pub cached: bool,
    /// True when this was not the first candidate tried.
    pub fallback: bool,
    /// Why the attempt failed; `None` for the attempt that produced the answer.
    pub error: Option<SleuthError>,
}

impl Attempt {
    /// Whether the failure was tagged as transient. Diagnostic only.
    #[must_use]
    pub fn retryable(&self) -> bool {
        self.error.as_ref().is_some_and(SleuthError::is_retryable)
    }

    /// Provider-reported status code, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.error.as_ref().and_then(SleuthError::status_code)
    }

    /// True when this attempt produced the answer.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one orchestrated request.
///
/// `response` is always populated: on total failure it is an empty payload whose
/// error field explains every attempt. `warnings` carries non-fatal issues such as
/// cache storage failures that did not prevent an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<T> {
    /// Payload returned to the caller.
    pub response: T,
    /// Candidates in the order they were tried.
    pub attempts: Vec<Attempt>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<SleuthError>,
}

impl<T> Report<T> {
    /// Provider that produced the answer, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.succeeded())
            .map(|a| a.provider.as_str())
    }

    /// True when the answer was served from the cache.
    #[must_use]
    pub fn served_from_cache(&self) -> bool {
        self.attempts.iter().any(|a| a.succeeded() && a.cached)
    }

    /// True when a provider other than the first candidate produced the answer.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.attempts.iter().any(|a| a.succeeded() && a.fallback)
    }

    /// Failed attempts in order.
    pub fn failures(&self) -> impl Iterator<Item = &Attempt> {
        self.attempts.iter().filter(|a| !a.succeeded())
    }
}
