//! The request orchestrator shared by all sub-clients.
//!
//! `make_request` decides between the local cache and the network from the
//! effective [`LocalCacheMode`], routes both paths through the same
//! classification and shape check, and writes successful network responses
//! back to the cache. Cache failures degrade to a live fetch.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::cache::{CacheEntryConfig, LocalCache, LocalCacheMode};
use crate::config::{ApiCallOptions, FetchCache, TokenProvider};
use crate::error::ApiClientError;
use crate::response::{ApiResponse, OkApiResponse, ResponseShape};
use crate::transport::{Transport, TransportRequest};

use super::common::{check_and_handle_error, classify_body, response_body_or_error};

/// The state every sub-client shares: resolved configuration, the transport
/// and the optional cache.
pub(crate) struct ClientCore {
  pub base_url: Url,
  pub token_provider: Option<Arc<dyn TokenProvider>>,
  pub transport: Arc<dyn Transport>,
  pub cache: Option<LocalCache>,
  pub max_entry_age: Duration,
  pub default_options: ApiCallOptions,
  pub extra_headers: Vec<(String, String)>,
}

/// Options for a single request. Fields left unset fall back to the
/// client's defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
  /// Full request URL, overriding the sub-client's base URL entirely.
  pub url: Option<Url>,
  /// Path appended to the sub-client's base URL. Slash-separated segments
  /// are appended individually.
  pub path: Option<String>,
  pub query: Vec<(String, String)>,
  /// Defaults to POST when a body is present, GET otherwise.
  pub method: Option<Method>,
  pub body: Option<Value>,
  pub fetch_cache: Option<FetchCache>,
  pub local_cache: Option<LocalCacheMode>,
  pub cache_entry_config: Option<CacheEntryConfig>,
  pub expect: ResponseShape,
}

/// A request scope under one path segment of the API.
#[derive(Clone)]
pub struct SubClient {
  core: Arc<ClientCore>,
  segment: String,
}

/// The cache key for a request: the hash of the fully-resolved URL.
fn cache_key(url: &Url) -> String {
  hex::encode(Sha256::digest(url.as_str().as_bytes()))
}

/// Whether a cached entry satisfies the effective mode right now.
fn entry_usable(config: &CacheEntryConfig, mode: LocalCacheMode, now: DateTime<Utc>) -> bool {
  let fresh = config.fresh_until.is_some_and(|t| t > now);
  let stale = config.stale_until.is_some_and(|t| t > now);
  (mode >= LocalCacheMode::Fresh && fresh)
    || (mode >= LocalCacheMode::Stale && stale)
    || mode >= LocalCacheMode::Always
}

impl SubClient {
  pub(crate) fn new(core: Arc<ClientCore>, segment: impl Into<String>) -> Self {
    Self {
      core,
      segment: segment.into(),
    }
  }

  /// Resolve the request URL from the base URL, the sub-client segment and
  /// the per-request path and query.
  fn determine_url(&self, options: &RequestOptions) -> Result<Url, ApiClientError> {
    let mut url = match &options.url {
      Some(url) => url.clone(),
      None => self.core.base_url.clone(),
    };

    {
      let mut segments = url
        .path_segments_mut()
        .map_err(|_| ApiClientError::Transport(String::from("base URL cannot carry a path")))?;
      segments.pop_if_empty();
      if options.url.is_none() && !self.segment.is_empty() {
        segments.push(&self.segment);
      }
      if let Some(path) = &options.path {
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
      }
    }

    if !options.query.is_empty() {
      url.query_pairs_mut().extend_pairs(&options.query);
    }

    Ok(url)
  }

  /// Make a request, consulting and updating the local cache according to
  /// the effective cache mode.
  pub async fn make_request(
    &self,
    options: RequestOptions,
  ) -> Result<OkApiResponse, ApiClientError> {
    let url = self.determine_url(&options)?;
    let defaults = self.core.default_options;
    let cache = self.core.cache.as_ref();

    let mut mode = options.local_cache.unwrap_or(defaults.local_cache);
    if cache.is_none() {
      mode = LocalCacheMode::Never;
    }

    if let Some(cache) = cache {
      if mode.is_fallback() {
        match cache.is_online().await {
          Ok(true) => {}
          Ok(false) => mode = mode.promote(),
          Err(error) => tracing::warn!(%error, "connectivity probe failed"),
        }
      }
    }

    let key = cache_key(&url);

    if mode != LocalCacheMode::Never {
      if let Some(cache) = cache {
        match cache.get(&key).await {
          Ok(Some(entry)) if entry_usable(&entry.config, mode, Utc::now()) => {
            tracing::debug!(%url, ?mode, "serving response from local cache");
            let classified = classify_body(&entry.value)?;
            let ok = check_and_handle_error(classified)?;
            return check_shape(ok, options.expect);
          }
          Ok(_) => {}
          Err(error) => tracing::warn!(%error, "cache read failed"),
        }
      }
    }

    let (classified, raw_body) = self.make_request_uncached(&url, &options).await?;
    let ok = check_and_handle_error(classified)?;
    let ok = check_shape(ok, options.expect)?;

    if mode != LocalCacheMode::Never {
      if let Some(cache) = cache {
        let mut config = options
          .cache_entry_config
          .unwrap_or(defaults.cache_entry_config);
        if config.expires_at.is_none() {
          config.expires_at = Some(Utc::now() + self.core.max_entry_age);
        }
        if let Err(error) = cache.set(&key, &raw_body, config).await {
          tracing::warn!(%error, "cache write failed");
        }
      }
    }

    Ok(ok)
  }

  /// The network-only path: build headers, send, classify. Returns the raw
  /// body alongside the classification so the caller can store it.
  pub async fn make_request_uncached(
    &self,
    url: &Url,
    options: &RequestOptions,
  ) -> Result<(ApiResponse, Value), ApiClientError> {
    let method = options.method.clone().unwrap_or(if options.body.is_some() {
      Method::POST
    } else {
      Method::GET
    });

    let mut request = TransportRequest::new(method);
    request
      .headers
      .push((String::from("Accept"), String::from("application/json")));

    if let Some(body) = &options.body {
      request
        .headers
        .push((String::from("Content-Type"), String::from("application/json")));
      request.body = Some(body.to_string());
    }

    let fetch_cache = options
      .fetch_cache
      .unwrap_or(self.core.default_options.fetch_cache);
    if let Some(value) = fetch_cache.cache_control() {
      request
        .headers
        .push((String::from("Cache-Control"), String::from(value)));
    }

    if let Some(provider) = &self.core.token_provider {
      if let Some(token) = provider.token().await {
        request
          .headers
          .push((String::from("Authorization"), format!("Bearer {token}")));
      }
    }

    request.headers.extend(self.core.extra_headers.iter().cloned());

    tracing::debug!(%url, method = %request.method, "sending request");

    let response = self
      .core
      .transport
      .fetch(url, request)
      .await
      .map_err(|e| ApiClientError::Transport(e.to_string()))?;

    response_body_or_error(&response)
  }
}

fn check_shape(
  response: OkApiResponse,
  expect: ResponseShape,
) -> Result<OkApiResponse, ApiClientError> {
  if expect.matches(&response) {
    Ok(response)
  } else {
    Err(ApiClientError::UnexpectedShape {
      expected: expect.label(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheProvider, MemoryProvider};
  use crate::response::{error_response_from, ok_response_from, ApiError};
  use crate::transport::{TransportError, TransportResponse};
  use async_trait::async_trait;
  use serde_json::json;
  use std::collections::VecDeque;
  use std::sync::Mutex;

  struct FakeTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    calls: Mutex<Vec<(Url, TransportRequest)>>,
  }

  impl FakeTransport {
    fn new(responses: Vec<TransportResponse>) -> Self {
      Self {
        responses: Mutex::new(responses.into()),
        calls: Mutex::new(Vec::new()),
      }
    }

    fn ok_json(body: Value) -> TransportResponse {
      TransportResponse {
        status: 200,
        status_text: String::from("OK"),
        body: body.to_string(),
      }
    }

    fn call_count(&self) -> usize {
      self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> (Url, TransportRequest) {
      self.calls.lock().unwrap().last().cloned().unwrap()
    }
  }

  #[async_trait]
  impl Transport for FakeTransport {
    async fn fetch(
      &self,
      url: &Url,
      request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
      self.calls.lock().unwrap().push((url.clone(), request));
      self
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .ok_or_else(|| TransportError(String::from("no scripted response left")))
    }
  }

  struct Fixture {
    client: SubClient,
    transport: Arc<FakeTransport>,
    provider: Arc<MemoryProvider>,
  }

  fn fixture(responses: Vec<TransportResponse>, default_mode: LocalCacheMode) -> Fixture {
    let transport = Arc::new(FakeTransport::new(responses));
    let provider = Arc::new(MemoryProvider::new());
    let core = Arc::new(ClientCore {
      base_url: Url::parse("https://portal.example.com/api").unwrap(),
      token_provider: None,
      transport: transport.clone(),
      cache: Some(LocalCache::new(provider.clone())),
      max_entry_age: Duration::hours(6),
      default_options: ApiCallOptions {
        local_cache: default_mode,
        ..Default::default()
      },
      extra_headers: Vec::new(),
    });
    Fixture {
      client: SubClient::new(core, "events"),
      transport,
      provider,
    }
  }

  fn request_key(fx: &Fixture, path: &str) -> String {
    let options = RequestOptions {
      path: Some(String::from(path)),
      ..Default::default()
    };
    cache_key(&fx.client.determine_url(&options).unwrap())
  }

  #[test]
  fn test_determine_url_appends_segment_path_and_query() {
    let fx = fixture(vec![], LocalCacheMode::Never);
    let options = RequestOptions {
      path: Some(String::from("e1/images")),
      query: vec![(String::from("page"), String::from("2"))],
      ..Default::default()
    };
    let url = fx.client.determine_url(&options).unwrap();
    assert_eq!(
      url.as_str(),
      "https://portal.example.com/api/events/e1/images?page=2"
    );
  }

  #[tokio::test]
  async fn test_usable_cache_hit_makes_no_transport_call() {
    let fx = fixture(vec![], LocalCacheMode::Fresh);
    let key = request_key(&fx, "e1");
    let cache = LocalCache::new(fx.provider.clone());
    cache
      .set(
        &key,
        &ok_response_from(Some(json!({"cached": true}))),
        CacheEntryConfig {
          fresh_until: Some(Utc::now() + Duration::hours(1)),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    let response = fx
      .client
      .make_request(RequestOptions {
        path: Some(String::from("e1")),
        ..Default::default()
      })
      .await
      .expect("request");

    assert_eq!(response.data, Some(json!({"cached": true})));
    assert_eq!(fx.transport.call_count(), 0);
  }

  #[tokio::test]
  async fn test_fallback_offline_promotes_to_stale() {
    let fx = fixture(vec![], LocalCacheMode::Fallback);
    fx.provider.set_online(false);
    let key = request_key(&fx, "e1");
    let cache = LocalCache::new(fx.provider.clone());
    cache
      .set(
        &key,
        &ok_response_from(Some(json!({"stale": true}))),
        CacheEntryConfig {
          stale_until: Some(Utc::now() + Duration::hours(1)),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    let response = fx
      .client
      .make_request(RequestOptions {
        path: Some(String::from("e1")),
        ..Default::default()
      })
      .await
      .expect("request");

    assert_eq!(response.data, Some(json!({"stale": true})));
    assert_eq!(fx.transport.call_count(), 0);
  }

  #[tokio::test]
  async fn test_fallback_online_ignores_stale_entry() {
    let fx = fixture(
      vec![FakeTransport::ok_json(ok_response_from(Some(
        json!({"live": true}),
      )))],
      LocalCacheMode::Fallback,
    );
    let key = request_key(&fx, "e1");
    let cache = LocalCache::new(fx.provider.clone());
    cache
      .set(
        &key,
        &ok_response_from(Some(json!({"stale": true}))),
        CacheEntryConfig {
          stale_until: Some(Utc::now() + Duration::hours(1)),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    let response = fx
      .client
      .make_request(RequestOptions {
        path: Some(String::from("e1")),
        ..Default::default()
      })
      .await
      .expect("request");

    assert_eq!(response.data, Some(json!({"live": true})));
    assert_eq!(fx.transport.call_count(), 1);
  }

  #[tokio::test]
  async fn test_mode_never_skips_cache_entirely() {
    let fx = fixture(
      vec![FakeTransport::ok_json(ok_response_from(Some(
        json!({"live": true}),
      )))],
      LocalCacheMode::Never,
    );
    let key = request_key(&fx, "e1");
    let cache = LocalCache::new(fx.provider.clone());
    cache
      .set(
        &key,
        &ok_response_from(Some(json!({"cached": true}))),
        CacheEntryConfig {
          fresh_until: Some(Utc::now() + Duration::hours(1)),
          ..Default::default()
        },
      )
      .await
      .unwrap();

    let response = fx
      .client
      .make_request(RequestOptions {
        path: Some(String::from("e1")),
        ..Default::default()
      })
      .await
      .expect("request");

    assert_eq!(response.data, Some(json!({"live": true})));
    assert_eq!(fx.transport.call_count(), 1);
    // The seeded entry is untouched.
    let entry = fx.provider.get(&key).await.unwrap().unwrap();
    assert!(entry.value.contains("cached"));
  }

  #[tokio::test]
  async fn test_write_back_uses_default_expiry() {
    let fx = fixture(
      vec![FakeTransport::ok_json(ok_response_from(Some(
        json!({"live": true}),
      )))],
      LocalCacheMode::Fallback,
    );

    let before = Utc::now();
    fx.client
      .make_request(RequestOptions {
        path: Some(String::from("e1")),
        ..Default::default()
      })
      .await
      .expect("request");
    let after = Utc::now();

    let key = request_key(&fx, "e1");
    let entry = fx.provider.get(&key).await.unwrap().expect("written back");
    let expires_at = entry.config.expires_at.expect("default expiry");
    assert!(expires_at >= before + Duration::hours(6));
    assert!(expires_at <= after + Duration::hours(6));
  }

  #[tokio::test]
  async fn test_error_response_is_not_written_back() {
    let body = error_response_from(&ApiError::new("nope"));
    let fx = fixture(
      vec![TransportResponse {
        status: 404,
        status_text: String::from("Not Found"),
        body: body.to_string(),
      }],
      LocalCacheMode::Fallback,
    );

    let result = fx
      .client
      .make_request(RequestOptions {
        path: Some(String::from("missing")),
        ..Default::default()
      })
      .await;

    match result {
      Err(ApiClientError::ErrorResponse(error)) => assert_eq!(error.error_message, "nope"),
      other => panic!("expected ErrorResponse, got {other:?}"),
    }
    let usage = fx.provider.cache_usage().await.unwrap();
    assert_eq!(usage.count, 0);
  }

  #[tokio::test]
  async fn test_shape_mismatch_is_unexpected_shape() {
    let fx = fixture(
      vec![FakeTransport::ok_json(ok_response_from(Some(
        json!({"singular": true}),
      )))],
      LocalCacheMode::Never,
    );

    let result = fx
      .client
      .make_request(RequestOptions {
        path: Some(String::from("e1")),
        expect: ResponseShape::Array,
        ..Default::default()
      })
      .await;

    assert!(matches!(
      result,
      Err(ApiClientError::UnexpectedShape { expected: "array ok" })
    ));
  }

  #[tokio::test]
  async fn test_body_defaults_to_post_with_json_headers() {
    let fx = fixture(
      vec![FakeTransport::ok_json(ok_response_from(None))],
      LocalCacheMode::Never,
    );

    fx.client
      .make_request(RequestOptions {
        body: Some(json!({"title": "t"})),
        ..Default::default()
      })
      .await
      .expect("request");

    let (url, request) = fx.transport.last_call();
    assert_eq!(url.as_str(), "https://portal.example.com/api/events");
    assert_eq!(request.method, Method::POST);
    assert!(request
      .headers
      .iter()
      .any(|(k, v)| k == "Content-Type" && v == "application/json"));
    assert_eq!(request.body.as_deref(), Some("{\"title\":\"t\"}"));
  }
}
