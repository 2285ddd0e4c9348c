//! SQLite-backed cache provider.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::entry::{CacheEntry, CacheEntryConfig, CacheUsage};
use super::provider::CacheProvider;
use super::CacheError;

/// Schema for the cache table. Timestamps are epoch milliseconds.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_cache (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    expires_at INTEGER,
    fresh_until INTEGER,
    stale_until INTEGER
);
"#;

/// Cache provider persisting entries in a local SQLite database.
pub struct SqliteProvider {
  conn: Mutex<Connection>,
  offline: AtomicBool,
}

impl SqliteProvider {
  /// Open the database at the default location, creating it if needed.
  pub fn open() -> Result<Self, CacheError> {
    let path = Self::default_path()?;

    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| CacheError::Provider(format!("failed to create cache directory: {e}")))?;
    }

    Self::open_at(&path)
  }

  /// Open the database at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self, CacheError> {
    let conn = Connection::open(path).map_err(|e| {
      CacheError::Provider(format!(
        "failed to open cache database at {}: {e}",
        path.display()
      ))
    })?;

    Self::from_connection(conn)
  }

  /// Open an in-memory database. Used in tests.
  pub fn in_memory() -> Result<Self, CacheError> {
    let conn = Connection::open_in_memory()
      .map_err(|e| CacheError::Provider(format!("failed to open in-memory database: {e}")))?;

    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self, CacheError> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| CacheError::Provider(format!("failed to run cache migrations: {e}")))?;

    Ok(Self {
      conn: Mutex::new(conn),
      offline: AtomicBool::new(false),
    })
  }

  fn default_path() -> Result<PathBuf, CacheError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| CacheError::Provider(String::from("could not determine data directory")))?;

    Ok(data_dir.join("portal-client").join("cache.db"))
  }

  /// Flip the connectivity flag reported by `connection_status`.
  pub fn set_online(&self, online: bool) {
    self.offline.store(!online, Ordering::Relaxed);
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CacheError> {
    self
      .conn
      .lock()
      .map_err(|e| CacheError::Provider(format!("lock poisoned: {e}")))
  }
}

fn to_millis(value: Option<DateTime<Utc>>) -> Option<i64> {
  value.map(|t| t.timestamp_millis())
}

fn from_millis(value: Option<i64>) -> Option<DateTime<Utc>> {
  value.and_then(DateTime::from_timestamp_millis)
}

#[async_trait]
impl CacheProvider for SqliteProvider {
  async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
    let conn = self.lock()?;

    let row: Option<(String, Option<i64>, Option<i64>, Option<i64>)> = conn
      .query_row(
        "SELECT value, expires_at, fresh_until, stale_until FROM local_cache WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
      )
      .optional()
      .map_err(|e| CacheError::Provider(format!("failed to read cache entry: {e}")))?;

    Ok(row.map(|(value, expires_at, fresh_until, stale_until)| CacheEntry {
      config: CacheEntryConfig {
        expires_at: from_millis(expires_at),
        fresh_until: from_millis(fresh_until),
        stale_until: from_millis(stale_until),
      },
      value,
    }))
  }

  async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO local_cache (key, value, expires_at, fresh_until, stale_until)
         VALUES (?, ?, ?, ?, ?)",
        params![
          key,
          entry.value,
          to_millis(entry.config.expires_at),
          to_millis(entry.config.fresh_until),
          to_millis(entry.config.stale_until),
        ],
      )
      .map_err(|e| CacheError::Provider(format!("failed to store cache entry: {e}")))?;

    Ok(())
  }

  async fn delete(&self, key: &str) -> Result<(), CacheError> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM local_cache WHERE key = ?", params![key])
      .map_err(|e| CacheError::Provider(format!("failed to delete cache entry: {e}")))?;

    Ok(())
  }

  async fn reset(&self) -> Result<(), CacheError> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM local_cache", [])
      .map_err(|e| CacheError::Provider(format!("failed to reset cache: {e}")))?;

    Ok(())
  }

  async fn cache_usage(&self) -> Result<CacheUsage, CacheError> {
    let conn = self.lock()?;

    let (count, size): (u64, u64) = conn
      .query_row(
        "SELECT COUNT(*), COALESCE(SUM(LENGTH(value)), 0) FROM local_cache",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .map_err(|e| CacheError::Provider(format!("failed to read cache usage: {e}")))?;

    Ok(CacheUsage { count, size })
  }

  async fn connection_status(&self) -> Result<bool, CacheError> {
    Ok(!self.offline.load(Ordering::Relaxed))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn entry_with_config(value: &str, config: CacheEntryConfig) -> CacheEntry {
    CacheEntry {
      config,
      value: String::from(value),
    }
  }

  #[tokio::test]
  async fn test_sqlite_round_trip_preserves_timestamps() {
    let provider = SqliteProvider::in_memory().expect("open");
    let fresh_until = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let config = CacheEntryConfig {
      expires_at: None,
      fresh_until: Some(fresh_until),
      stale_until: None,
    };

    provider
      .set("k", entry_with_config("{\"a\":1}", config))
      .await
      .expect("set");

    let fetched = provider.get("k").await.expect("get").expect("present");
    assert_eq!(fetched.value, "{\"a\":1}");
    assert_eq!(fetched.config.fresh_until, Some(fresh_until));
    assert_eq!(fetched.config.expires_at, None);
    assert_eq!(fetched.config.stale_until, None);
  }

  #[tokio::test]
  async fn test_sqlite_set_overwrites_existing_entry() {
    let provider = SqliteProvider::in_memory().expect("open");
    provider
      .set("k", entry_with_config("old", CacheEntryConfig::default()))
      .await
      .expect("set");
    provider
      .set("k", entry_with_config("new", CacheEntryConfig::default()))
      .await
      .expect("set");

    let fetched = provider.get("k").await.expect("get").expect("present");
    assert_eq!(fetched.value, "new");

    let usage = provider.cache_usage().await.expect("usage");
    assert_eq!(usage.count, 1);
    assert_eq!(usage.size, 3);
  }

  #[tokio::test]
  async fn test_sqlite_delete_and_reset() {
    let provider = SqliteProvider::in_memory().expect("open");
    provider
      .set("a", entry_with_config("1", CacheEntryConfig::default()))
      .await
      .expect("set");
    provider
      .set("b", entry_with_config("2", CacheEntryConfig::default()))
      .await
      .expect("set");

    provider.delete("a").await.expect("delete");
    assert!(provider.get("a").await.expect("get").is_none());

    provider.reset().await.expect("reset");
    let usage = provider.cache_usage().await.expect("usage");
    assert_eq!(usage.count, 0);
  }
}
