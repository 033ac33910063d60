//! sleuth-core
//!
//! Provider contracts shared across the sleuth ecosystem.
//!
//! - `connector`: the `SleuthConnector` trait and the `SearchProvider` / `ScrapeProvider`
//!   role traits implemented by provider clients.
//! - `payload`: the `Payload` trait that lets the orchestrator cache, judge, and
//!   synthesize results generically.
//! - `types`: request types and re-exports of `sleuth-types`.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Provider calls are `async` and are driven by the orchestrator under Tokio
//! timeouts, so connectors must be runtime-compatible with Tokio 1.x.
#![warn(missing_docs)]

/// Provider role traits and the primary `SleuthConnector` interface.
pub mod connector;
/// Generic payload contract used by orchestration and caching.
pub mod payload;
pub mod types;

pub use connector::{ScrapeProvider, SearchProvider, SleuthConnector};
pub use payload::Payload;
pub use types::*;
