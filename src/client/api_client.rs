//! API client factory and sub-client wiring.

use std::sync::Arc;

use crate::cache::{CacheError, CacheUsage, LocalCache};
use crate::config::ApiClientConfig;
use crate::transport::ReqwestTransport;

use super::configurations::ConfigurationClient;
use super::events::EventClient;
use super::sub_client::{ClientCore, SubClient};

/// The portal API client. Cheap to clone; all clones share the transport
/// and the cache.
#[derive(Clone)]
pub struct ApiClient {
  core: Arc<ClientCore>,
}

impl ApiClient {
  pub fn new(config: ApiClientConfig) -> Self {
    let transport = config
      .transport
      .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

    let (cache, max_entry_age) = match config.cache {
      Some(cache) => (
        Some(LocalCache::new(cache.provider)),
        cache.max_entry_age,
      ),
      None => (None, chrono::Duration::hours(6)),
    };

    Self {
      core: Arc::new(ClientCore {
        base_url: config.base_url,
        token_provider: config.token_provider,
        transport,
        cache,
        max_entry_age,
        default_options: config.default_options,
        extra_headers: config.extra_headers,
      }),
    }
  }

  pub fn events(&self) -> EventClient {
    EventClient::new(SubClient::new(self.core.clone(), "events"))
  }

  pub fn configurations(&self) -> ConfigurationClient {
    ConfigurationClient::new(SubClient::new(self.core.clone(), "configurations"))
  }

  /// Drop every local cache entry. A no-op without a configured cache.
  pub async fn reset_cache(&self) -> Result<(), CacheError> {
    match &self.core.cache {
      Some(cache) => cache.reset().await,
      None => Ok(()),
    }
  }

  /// Aggregate local cache usage. Zero without a configured cache.
  pub async fn cache_usage(&self) -> Result<CacheUsage, CacheError> {
    match &self.core.cache {
      Some(cache) => cache.usage().await,
      None => Ok(CacheUsage::default()),
    }
  }
}
