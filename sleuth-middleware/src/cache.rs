//! Persistent response cache backed by SQLite.
//!
//! Payloads are stored as JSON text keyed by a SHA-256 digest of
//! `(provider, operation, query)`. Freshness is decided per data type and
//! expired rows are removed lazily on lookup or in bulk by
//! [`ResponseCache::evict_expired`].
//!
//! The database runs in WAL mode with one writer connection and one reader
//! connection, so lookups do not queue behind writes. All storage work runs on
//! Tokio's blocking pool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use sleuth_types::{CacheConfig, CacheStats, DataType, Operation, SleuthError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS response_cache (
    cache_key TEXT PRIMARY KEY,
    api_name TEXT NOT NULL,
    operation TEXT NOT NULL,
    query TEXT NOT NULL,
    data_type TEXT NOT NULL,
    response TEXT NOT NULL,
    created_at REAL NOT NULL,
    expires_at REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_expires ON response_cache(expires_at);
";

const FALLBACK_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// Derive the storage key for a `(provider, operation, query)` triple.
///
/// Each component is length-prefixed before hashing, so distinct triples never
/// share an input byte string. The result is 64 lowercase hex characters.
#[must_use]
pub fn make_key(provider: &str, operation: Operation, query: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [provider, operation.as_str(), query] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Diagnostic columns stored next to a payload. Only `data_type` affects behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Provider that produced the payload.
    pub provider: String,
    /// Operation that produced the payload.
    pub operation: Operation,
    /// Query or URL the payload answers.
    pub query: String,
    /// Freshness category selecting the TTL.
    pub data_type: DataType,
}

impl CacheEntry {
    /// Convenience constructor.
    pub fn new(
        provider: impl Into<String>,
        operation: Operation,
        query: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            provider: provider.into(),
            operation,
            query: query.into(),
            data_type,
        }
    }
}

enum Lookup {
    Fresh(String),
    Expired { removed: usize },
    Absent,
}

struct Inner {
    path: PathBuf,
    ttls: BTreeMap<String, Duration>,
    writer: Mutex<Option<Connection>>,
    reader: Mutex<Option<Connection>>,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    evictions: AtomicU64,
}

/// Shared handle to the on-disk response cache. Cloning is cheap.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("path", &self.inner.path)
            .field("ttls", &self.inner.ttls)
            .finish_non_exhaustive()
    }
}

fn storage(e: impl std::fmt::Display) -> SleuthError {
    SleuthError::storage(e.to_string())
}

fn now_secs() -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = Utc::now().timestamp_millis() as f64;
    millis / 1000.0
}

fn open_connection(path: &Path) -> Result<Connection, SleuthError> {
    let conn = Connection::open(path)
        .map_err(|e| SleuthError::storage(format!("open {}: {e}", path.display())))?;
    conn.busy_timeout(Duration::from_secs(5)).map_err(storage)?;
    Ok(conn)
}

impl ResponseCache {
    /// `<home>/.sleuth/research_cache.db`, or the temp directory when no home exists.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".sleuth")
            .join("research_cache.db")
    }

    /// Open (creating if needed) the cache described by `config`.
    ///
    /// # Errors
    /// Returns `Storage` when the directory or database cannot be created.
    pub fn open(config: &CacheConfig) -> Result<Self, SleuthError> {
        let path = config.path.clone().unwrap_or_else(Self::default_path);
        Self::open_with_ttls(path, config.effective_ttls())
    }

    /// Open a cache file with the default TTL table.
    ///
    /// # Errors
    /// Returns `Storage` when the directory or database cannot be created.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, SleuthError> {
        Self::open(&CacheConfig::default().with_path(path))
    }

    fn open_with_ttls(
        path: PathBuf,
        ttls: BTreeMap<String, Duration>,
    ) -> Result<Self, SleuthError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SleuthError::storage(format!("create {}: {e}", parent.display())))?;
        }

        let writer = open_connection(&path)?;
        writer
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(storage)?;
        writer.execute_batch(SCHEMA).map_err(storage)?;
        let reader = open_connection(&path)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sleuth::cache", path = %path.display(), "response cache opened");

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                ttls,
                writer: Mutex::new(Some(writer)),
                reader: Mutex::new(Some(reader)),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                stores: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        })
    }

    /// Database file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// See [`make_key`].
    #[must_use]
    pub fn make_key(provider: &str, operation: Operation, query: &str) -> String {
        make_key(provider, operation, query)
    }

    /// TTL applied to entries of `data_type`; unknown types use the `general` TTL.
    #[must_use]
    pub fn ttl_for(&self, data_type: &DataType) -> Duration {
        let ttls = &self.inner.ttls;
        ttls.get(data_type.as_str())
            .or_else(|| ttls.get(DataType::General.as_str()))
            .copied()
            .unwrap_or(FALLBACK_TTL)
    }

    /// Fetch a fresh payload.
    ///
    /// An expired row is deleted as part of the lookup and reported as a miss.
    /// A row that no longer decodes as `T` is deleted too and counts as a miss.
    ///
    /// # Errors
    /// Returns `Storage` on database failure and `Serialization` when the stored
    /// payload does not decode as `T`.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, SleuthError>
    where
        T: DeserializeOwned,
    {
        let owned = key.to_string();
        let lookup = self
            .blocking(move |inner| {
                let now = now_secs();
                let row: Option<(String, f64)> = inner.with_reader(|conn| {
                    conn.query_row(
                        "SELECT response, expires_at FROM response_cache WHERE cache_key = ?1",
                        params![owned],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()
                    .map_err(storage)
                })?;
                match row {
                    None => Ok(Lookup::Absent),
                    Some((_, expires_at)) if now >= expires_at => {
                        let removed = inner.with_writer(|conn| {
                            conn.execute(
                                "DELETE FROM response_cache \
                                 WHERE cache_key = ?1 AND expires_at <= ?2",
                                params![owned, now],
                            )
                            .map_err(storage)
                        })?;
                        Ok(Lookup::Expired { removed })
                    }
                    Some((response, _)) => Ok(Lookup::Fresh(response)),
                }
            })
            .await?;

        match lookup {
            Lookup::Fresh(raw) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(value))
                }
                Err(e) => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    let removed = self.discard(key, raw).await?;
                    self.inner.evictions.fetch_add(removed, Ordering::Relaxed);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        target: "sleuth::cache",
                        error = %e,
                        "undecodable entry discarded"
                    );
                    Err(e.into())
                }
            },
            Lookup::Expired { removed } => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                self.inner
                    .evictions
                    .fetch_add(removed as u64, Ordering::Relaxed);
                #[cfg(feature = "tracing")]
                if removed > 0 {
                    tracing::debug!(target: "sleuth::cache", "expired entry evicted on lookup");
                }
                Ok(None)
            }
            Lookup::Absent => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Delete `key` only if it still holds `response`, so a concurrent replace survives.
    async fn discard(&self, key: &str, response: String) -> Result<u64, SleuthError> {
        let key = key.to_string();
        let removed = self
            .blocking(move |inner| {
                inner.with_writer(|conn| {
                    conn.execute(
                        "DELETE FROM response_cache WHERE cache_key = ?1 AND response = ?2",
                        params![key, response],
                    )
                    .map_err(storage)
                })
            })
            .await?;
        Ok(removed as u64)
    }

    /// Insert or replace the payload stored under `key`.
    ///
    /// The entry expires `ttl_for(entry.data_type)` from now.
    ///
    /// # Errors
    /// Returns `Serialization` if the payload cannot be encoded and `Storage` if
    /// the write fails.
    pub async fn put<T>(
        &self,
        key: &str,
        payload: &T,
        entry: CacheEntry,
    ) -> Result<(), SleuthError>
    where
        T: Serialize + ?Sized,
    {
        let response = serde_json::to_string(payload)?;
        let ttl = self.ttl_for(&entry.data_type).as_secs_f64();
        let key = key.to_string();
        self.blocking(move |inner| {
            let created_at = now_secs();
            inner.with_writer(|conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO response_cache
                     (cache_key, api_name, operation, query, data_type, response,
                      created_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        key,
                        entry.provider,
                        entry.operation.as_str(),
                        entry.query,
                        entry.data_type.as_str(),
                        response,
                        created_at,
                        created_at + ttl,
                    ],
                )
                .map_err(storage)
            })
        })
        .await?;
        self.inner.stores.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Delete every entry whose expiry has passed; returns how many were removed.
    ///
    /// # Errors
    /// Returns `Storage` on database failure.
    pub async fn evict_expired(&self) -> Result<u64, SleuthError> {
        let removed = self
            .blocking(|inner| {
                inner.with_writer(|conn| {
                    conn.execute(
                        "DELETE FROM response_cache WHERE expires_at < ?1",
                        params![now_secs()],
                    )
                    .map_err(storage)
                })
            })
            .await? as u64;
        self.inner.evictions.fetch_add(removed, Ordering::Relaxed);
        #[cfg(feature = "tracing")]
        if removed > 0 {
            tracing::info!(target: "sleuth::cache", removed, "evicted expired entries");
        }
        Ok(removed)
    }

    /// Delete every entry; returns how many were removed.
    ///
    /// # Errors
    /// Returns `Storage` on database failure.
    pub async fn clear(&self) -> Result<u64, SleuthError> {
        let removed = self
            .blocking(|inner| {
                inner.with_writer(|conn| {
                    conn.execute("DELETE FROM response_cache", [])
                        .map_err(storage)
                })
            })
            .await?;
        Ok(removed as u64)
    }

    /// Rows currently stored, expired or not.
    ///
    /// # Errors
    /// Returns `Storage` on database failure.
    pub async fn len(&self) -> Result<u64, SleuthError> {
        self.blocking(|inner| {
            inner.with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| {
                    row.get::<_, i64>(0)
                })
                .map(|n| u64::try_from(n).unwrap_or(0))
                .map_err(storage)
            })
        })
        .await
    }

    /// True when no rows are stored.
    ///
    /// # Errors
    /// Returns `Storage` on database failure.
    pub async fn is_empty(&self) -> Result<bool, SleuthError> {
        Ok(self.len().await? == 0)
    }

    /// Counter snapshot plus the current row count.
    ///
    /// # Errors
    /// Returns `Storage` if the row count cannot be read.
    pub async fn stats(&self) -> Result<CacheStats, SleuthError> {
        let total_entries = self.len().await?;
        Ok(CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            stores: self.inner.stores.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
            total_entries,
        })
    }

    /// Close both connections. Later operations fail with `Storage`.
    pub fn close(&self) {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.inner
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R, SleuthError>
    where
        F: FnOnce(&Inner) -> Result<R, SleuthError> + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| SleuthError::storage(format!("cache task failed: {e}")))?
    }
}

impl Inner {
    fn with_writer<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, SleuthError>,
    ) -> Result<R, SleuthError> {
        let guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard
            .as_ref()
            .ok_or_else(|| SleuthError::storage("cache is closed"))?;
        f(conn)
    }

    fn with_reader<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, SleuthError>,
    ) -> Result<R, SleuthError> {
        let guard = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard
            .as_ref()
            .ok_or_else(|| SleuthError::storage("cache is closed"))?;
        f(conn)
    }
}
