//! Cache entry model.
//!
//! An entry can be in one of four states: fresh (probably identical to the
//! server), stale (old but possibly still right), valid (not yet expired,
//! nothing else known) and expired (must be deleted on encounter). All
//! boundaries are absolute timestamps, serialized as epoch milliseconds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Freshness boundaries for a cache entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryConfig {
  /// When the entry stops being usable at all. Expired entries are deleted
  /// on the next encounter; absent means the entry never expires.
  #[serde(
    default,
    with = "chrono::serde::ts_milliseconds_option",
    skip_serializing_if = "Option::is_none"
  )]
  pub expires_at: Option<DateTime<Utc>>,
  /// Until when the entry counts as fresh. Absent means never fresh.
  /// When both are present this should be <= `stale_until`; the usability
  /// policy assumes that ordering but does not enforce it.
  #[serde(
    default,
    with = "chrono::serde::ts_milliseconds_option",
    skip_serializing_if = "Option::is_none"
  )]
  pub fresh_until: Option<DateTime<Utc>>,
  /// Until when the entry counts as stale. Absent means never stale.
  #[serde(
    default,
    with = "chrono::serde::ts_milliseconds_option",
    skip_serializing_if = "Option::is_none"
  )]
  pub stale_until: Option<DateTime<Utc>>,
}

impl CacheEntryConfig {
  /// Whether `expires_at` has already passed.
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|at| at < now)
  }
}

/// The entry as the provider stores it: the value is JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
  #[serde(flatten)]
  pub config: CacheEntryConfig,
  pub value: String,
}

/// The entry as the store hands it out: the value is structured.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCacheEntry {
  pub config: CacheEntryConfig,
  pub value: Value,
}

/// Aggregate usage reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheUsage {
  /// The number of entries.
  pub count: u64,
  /// The total size of all entries in bytes, or a best-effort estimate.
  pub size: u64,
}
