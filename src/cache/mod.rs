//! The tiered local cache: mode policy, entry model, providers and the
//! store that ties them together.
//!
//! The cache is an optimization, never a source of truth — a provider
//! failure degrades to a live fetch, and each client instance owns an
//! independent cache (no cross-process coherency).

mod entry;
mod mode;
mod provider;
mod sqlite;
mod store;

pub use entry::{CacheEntry, CacheEntryConfig, CacheUsage, ParsedCacheEntry};
pub use mode::LocalCacheMode;
pub use provider::{CacheProvider, MemoryProvider};
pub use sqlite::SqliteProvider;
pub use store::LocalCache;

/// Errors raised by the cache layer. These indicate a caching bug or a
/// provider failure, not a request failure — the orchestrator treats cache
/// operations as best-effort.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("the cache entry value must be a primitive object")]
  NotPrimitive,

  #[error("cache provider error: {0}")]
  Provider(String),

  #[error("cache codec error: {0}")]
  Codec(#[from] serde_json::Error),
}
