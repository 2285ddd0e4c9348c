//! Client configuration: construction-time wiring, per-call options and the
//! optional YAML config file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde::Deserialize;
use url::Url;

use crate::cache::{CacheEntryConfig, CacheProvider, LocalCacheMode};
use crate::transport::Transport;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(String),

  #[error("failed to read config file {path}: {source}")]
  Io {
    path: String,
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: String,
    source: serde_yaml::Error,
  },

  #[error("invalid base URL {url}: {source}")]
  BaseUrl { url: String, source: url::ParseError },

  #[error("failed to open cache database: {0}")]
  Cache(#[from] crate::cache::CacheError),
}

/// Source of the bearer token attached to requests. Returning `None` sends
/// the request unauthenticated.
#[async_trait]
pub trait TokenProvider: Send + Sync {
  async fn token(&self) -> Option<String>;
}

/// Token provider reading `PORTAL_API_TOKEN` from the environment on every
/// request, so a rotated token is picked up without a restart.
pub struct EnvTokenProvider;

#[async_trait]
impl TokenProvider for EnvTokenProvider {
  async fn token(&self) -> Option<String> {
    std::env::var("PORTAL_API_TOKEN").ok()
  }
}

/// The HTTP-level cache behavior requested from the transport, mirroring the
/// browser fetch cache modes. This is advisory — it becomes a
/// `Cache-Control` request header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchCache {
  #[default]
  Default,
  NoStore,
  Reload,
  NoCache,
  ForceCache,
  OnlyIfCached,
}

impl FetchCache {
  /// The `Cache-Control` request header value for this mode, if any.
  pub fn cache_control(self) -> Option<&'static str> {
    match self {
      FetchCache::Default => None,
      FetchCache::NoStore | FetchCache::Reload => Some("no-store"),
      FetchCache::NoCache => Some("no-cache"),
      FetchCache::ForceCache => Some("max-stale"),
      FetchCache::OnlyIfCached => Some("only-if-cached"),
    }
  }
}

/// Per-call options. The client's defaults apply where a call does not
/// override them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiCallOptions {
  pub fetch_cache: FetchCache,
  pub local_cache: LocalCacheMode,
  /// Freshness boundaries written back to the local cache on success.
  /// Fields left `None` get the client's write-back defaults.
  pub cache_entry_config: CacheEntryConfig,
}

/// Local cache wiring for a client.
#[derive(Clone)]
pub struct LocalCacheConfig {
  pub provider: Arc<dyn CacheProvider>,
  /// Hard expiry applied to write-backs that don't set `expires_at`
  /// themselves.
  pub max_entry_age: Duration,
}

impl LocalCacheConfig {
  pub fn new(provider: Arc<dyn CacheProvider>) -> Self {
    Self {
      provider,
      max_entry_age: Duration::hours(6),
    }
  }
}

/// Everything needed to build an [`ApiClient`](crate::client::ApiClient).
///
/// [`transport`](Self::transport) is `None` for the production reqwest
/// transport; tests inject scripted ones.
#[derive(Clone)]
pub struct ApiClientConfig {
  pub base_url: Url,
  /// `None` sends requests unauthenticated.
  pub token_provider: Option<Arc<dyn TokenProvider>>,
  pub cache: Option<LocalCacheConfig>,
  pub default_options: ApiCallOptions,
  pub transport: Option<Arc<dyn Transport>>,
  /// Headers appended to every request after the standard ones.
  pub extra_headers: Vec<(String, String)>,
}

impl ApiClientConfig {
  pub fn new(base_url: Url) -> Self {
    Self {
      base_url,
      token_provider: Some(Arc::new(EnvTokenProvider)),
      cache: None,
      default_options: ApiCallOptions::default(),
      transport: None,
      extra_headers: Vec::new(),
    }
  }
}

/// The YAML config file, for hosts that wire the client from disk instead
/// of code.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
  pub base_url: String,
  /// Default local cache mode for all calls.
  #[serde(default)]
  pub local_cache: LocalCacheMode,
  /// Path of the SQLite cache database. Absent means the platform data
  /// directory.
  pub cache_path: Option<PathBuf>,
}

impl FileConfig {
  /// Load the config file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./portal-client.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/portal-client/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        p.to_path_buf()
      } else {
        return Err(ConfigError::NotFound(p.display().to_string()));
      }
    } else {
      Self::find_config_file().ok_or_else(|| {
        ConfigError::NotFound(String::from(
          "no portal-client.yaml in the current directory or XDG config directory",
        ))
      })?
    };

    Self::load_from_path(&path)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("portal-client.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("portal-client").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
      path: path.display().to_string(),
      source: e,
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.display().to_string(),
      source: e,
    })
  }

  /// Turn the file config into a client config with the default token
  /// provider and transport. A `cache_path` wires up the SQLite provider.
  pub fn into_client_config(self) -> Result<ApiClientConfig, ConfigError> {
    let base_url = Url::parse(&self.base_url).map_err(|e| ConfigError::BaseUrl {
      url: self.base_url.clone(),
      source: e,
    })?;

    let mut config = ApiClientConfig::new(base_url);
    config.default_options.local_cache = self.local_cache;
    if let Some(path) = &self.cache_path {
      let provider = crate::cache::SqliteProvider::open_at(path)?;
      config.cache = Some(LocalCacheConfig::new(Arc::new(provider)));
    }
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_file_config_parses_yaml() {
    let yaml = r#"
base_url: "https://portal.example.com/api"
local_cache: fallback-fresh
cache_path: "/tmp/portal-cache.db"
"#;
    let config: FileConfig = serde_yaml::from_str(yaml).expect("parse");
    assert_eq!(config.base_url, "https://portal.example.com/api");
    assert_eq!(config.local_cache, LocalCacheMode::FallbackFresh);
    assert_eq!(config.cache_path, Some(PathBuf::from("/tmp/portal-cache.db")));
  }

  #[test]
  fn test_file_config_defaults_local_cache_mode() {
    let yaml = "base_url: \"https://portal.example.com\"\n";
    let config: FileConfig = serde_yaml::from_str(yaml).expect("parse");
    assert_eq!(config.local_cache, LocalCacheMode::default());
    assert_eq!(config.cache_path, None);
  }

  #[test]
  fn test_fetch_cache_header_values() {
    assert_eq!(FetchCache::Default.cache_control(), None);
    assert_eq!(FetchCache::NoStore.cache_control(), Some("no-store"));
    assert_eq!(FetchCache::Reload.cache_control(), Some("no-store"));
    assert_eq!(FetchCache::NoCache.cache_control(), Some("no-cache"));
    assert_eq!(FetchCache::ForceCache.cache_control(), Some("max-stale"));
    assert_eq!(
      FetchCache::OnlyIfCached.cache_control(),
      Some("only-if-cached")
    );
  }

  #[test]
  fn test_into_client_config_rejects_bad_url() {
    let file = FileConfig {
      base_url: String::from("not a url"),
      local_cache: LocalCacheMode::default(),
      cache_path: None,
    };
    assert!(matches!(
      file.into_client_config(),
      Err(ConfigError::BaseUrl { .. })
    ));
  }
}
