//! The local cache store: codec and expiry policy over a provider.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::validation::is_primitive_object;

use super::entry::{CacheEntry, CacheEntryConfig, CacheUsage, ParsedCacheEntry};
use super::provider::CacheProvider;
use super::CacheError;

/// A tiered local cache over a pluggable provider.
///
/// Values are stored as JSON text and parsed back on read. Expiry is
/// enforced lazily: an expired entry is deleted the next time it is read.
#[derive(Clone)]
pub struct LocalCache {
  provider: Arc<dyn CacheProvider>,
}

impl LocalCache {
  pub fn new(provider: Arc<dyn CacheProvider>) -> Self {
    Self { provider }
  }

  /// Read an entry, returning `None` for misses and expired entries.
  /// Reading an expired entry removes it.
  pub async fn get(&self, key: &str) -> Result<Option<ParsedCacheEntry>, CacheError> {
    let entry = match self.provider.get(key).await? {
      Some(entry) => entry,
      None => return Ok(None),
    };

    if entry.config.is_expired(Utc::now()) {
      self.provider.delete(key).await?;
      return Ok(None);
    }

    let value: Value = serde_json::from_str(&entry.value)?;

    Ok(Some(ParsedCacheEntry {
      config: entry.config,
      value,
    }))
  }

  /// Store a value. Only primitive objects are accepted — anything else
  /// would not survive the JSON round trip losslessly. Storing with an
  /// already-past expiry deletes the key instead.
  pub async fn set(
    &self,
    key: &str,
    value: &Value,
    config: CacheEntryConfig,
  ) -> Result<(), CacheError> {
    if config.is_expired(Utc::now()) {
      return self.provider.delete(key).await;
    }

    if !is_primitive_object(value) {
      return Err(CacheError::NotPrimitive);
    }

    let entry = CacheEntry {
      config,
      value: value.to_string(),
    };

    self.provider.set(key, entry).await
  }

  pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
    self.provider.delete(key).await
  }

  pub async fn reset(&self) -> Result<(), CacheError> {
    self.provider.reset().await
  }

  pub async fn usage(&self) -> Result<CacheUsage, CacheError> {
    self.provider.cache_usage().await
  }

  /// Whether the provider believes the host is online.
  pub async fn is_online(&self) -> Result<bool, CacheError> {
    self.provider.connection_status().await
  }
}
