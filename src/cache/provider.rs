//! Cache provider trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::entry::{CacheEntry, CacheUsage};
use super::CacheError;

/// A key/value backend for the local cache.
///
/// Providers see values only as JSON text; the store owns the codec. A
/// provider may or may not be concurrent-safe internally — the store makes
/// no atomicity assumption across a read-then-write.
#[async_trait]
pub trait CacheProvider: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

  async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError>;

  async fn delete(&self, key: &str) -> Result<(), CacheError>;

  /// Delete all entries.
  async fn reset(&self) -> Result<(), CacheError>;

  async fn cache_usage(&self) -> Result<CacheUsage, CacheError>;

  /// The provider's connectivity probe. Drives fallback-mode promotion.
  async fn connection_status(&self) -> Result<bool, CacheError>;
}

/// An in-memory provider. Connectivity is a host-set flag, defaulting to
/// online.
#[derive(Default)]
pub struct MemoryProvider {
  entries: Mutex<HashMap<String, CacheEntry>>,
  offline: AtomicBool,
}

impl MemoryProvider {
  pub fn new() -> Self {
    Self::default()
  }

  /// Flip the connectivity flag reported by `connection_status`.
  pub fn set_online(&self, online: bool) {
    self.offline.store(!online, Ordering::Relaxed);
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>, CacheError> {
    self
      .entries
      .lock()
      .map_err(|e| CacheError::Provider(format!("lock poisoned: {e}")))
  }
}

#[async_trait]
impl CacheProvider for MemoryProvider {
  async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
    Ok(self.lock()?.get(key).cloned())
  }

  async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
    self.lock()?.insert(String::from(key), entry);
    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), CacheError> {
    self.lock()?.remove(key);
    Ok(())
  }

  async fn reset(&self) -> Result<(), CacheError> {
    self.lock()?.clear();
    Ok(())
  }

  async fn cache_usage(&self) -> Result<CacheUsage, CacheError> {
    let entries = self.lock()?;
    let size = entries.values().map(|e| e.value.len() as u64).sum();
    Ok(CacheUsage {
      count: entries.len() as u64,
      size,
    })
  }

  async fn connection_status(&self) -> Result<bool, CacheError> {
    Ok(!self.offline.load(Ordering::Relaxed))
  }
}
