//! The HTTP transport seam.
//!
//! The client core never talks to the network directly; it goes through the
//! [`Transport`] trait so tests can substitute a scripted implementation.
//! The production implementation wraps [`reqwest`].

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// A request as the client core describes it, independent of any HTTP
/// library.
#[derive(Debug, Clone)]
pub struct TransportRequest {
  pub method: Method,
  pub headers: Vec<(String, String)>,
  pub body: Option<String>,
}

impl TransportRequest {
  pub fn new(method: Method) -> Self {
    Self {
      method,
      headers: Vec::new(),
      body: None,
    }
  }
}

/// A fully buffered response. Bodies in this protocol are small JSON
/// documents, so there is no streaming surface.
#[derive(Debug, Clone)]
pub struct TransportResponse {
  pub status: u16,
  pub status_text: String,
  pub body: String,
}

impl TransportResponse {
  /// Whether the status is in the 2xx range.
  pub fn ok(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Parse the body as JSON.
  pub fn json(&self) -> serde_json::Result<Value> {
    serde_json::from_str(&self.body)
  }
}

/// Errors from the transport itself: connection failures, timeouts, invalid
/// responses at the protocol level. An HTTP error status is NOT a transport
/// error — it comes back as a normal [`TransportResponse`].
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport: Send + Sync {
  async fn fetch(
    &self,
    url: &Url,
    request: TransportRequest,
  ) -> Result<TransportResponse, TransportError>;
}

/// The production transport, backed by a shared [`reqwest::Client`].
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
    }
  }
}

impl Default for ReqwestTransport {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn fetch(
    &self,
    url: &Url,
    request: TransportRequest,
  ) -> Result<TransportResponse, TransportError> {
    let mut builder = self.client.request(request.method, url.clone());

    for (name, value) in &request.headers {
      builder = builder.header(name, value);
    }

    if let Some(body) = request.body {
      builder = builder.body(body);
    }

    let response = builder
      .send()
      .await
      .map_err(|e| TransportError(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;

    Ok(TransportResponse {
      status: status.as_u16(),
      status_text: String::from(status.canonical_reason().unwrap_or("")),
      body,
    })
  }
}
