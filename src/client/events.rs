//! The events sub-client.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::LocalCacheMode;
use crate::error::ApiClientError;
use crate::resource::EventResource;
use crate::response::ResponseShape;

use super::common::{
  deserialize_created, deserialize_paginated, deserialize_resource, CreatedResource,
  DeserializedResource, PaginatedResources,
};
use super::sub_client::{RequestOptions, SubClient};

/// The request body for creating an event. Occurrences go over the wire as
/// RFC 3339 strings, the duration as milliseconds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  pub occurrences: Vec<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<f64>,
}

pub struct EventClient {
  sub_client: SubClient,
}

impl EventClient {
  pub(crate) fn new(sub_client: SubClient) -> Self {
    Self { sub_client }
  }

  /// Get a single event by id.
  pub async fn get_event(
    &self,
    event_id: &str,
  ) -> Result<DeserializedResource<EventResource>, ApiClientError> {
    let response = self
      .sub_client
      .make_request(RequestOptions {
        path: Some(String::from(event_id)),
        expect: ResponseShape::Singular,
        ..Default::default()
      })
      .await?;
    deserialize_resource(response)
  }

  /// List all events, paginated by the server.
  pub async fn list_events(&self) -> Result<PaginatedResources<EventResource>, ApiClientError> {
    let response = self
      .sub_client
      .make_request(RequestOptions {
        expect: ResponseShape::Paginated,
        ..Default::default()
      })
      .await?;
    deserialize_paginated(response)
  }

  /// Create an event. Never served from or written to the local cache.
  pub async fn create_event(
    &self,
    body: &CreateEventBody,
  ) -> Result<CreatedResource<EventResource>, ApiClientError> {
    let body = serde_json::to_value(body)
      .map_err(|e| ApiClientError::MalformedResponse(format!("unencodable request body: {e}")))?;
    let response = self
      .sub_client
      .make_request(RequestOptions {
        body: Some(body),
        local_cache: Some(LocalCacheMode::Never),
        expect: ResponseShape::Created,
        ..Default::default()
      })
      .await?;
    deserialize_created(response)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use serde_json::json;

  #[test]
  fn test_create_event_body_serializes_camel_case() {
    let body = CreateEventBody {
      title: String::from("Launch party"),
      summary: None,
      description: Some(String::from("Bring snacks")),
      location: None,
      occurrences: vec![Utc.with_ymd_and_hms(2026, 9, 1, 18, 0, 0).unwrap()],
      duration: Some(3_600_000.0),
    };
    let value = serde_json::to_value(&body).expect("encode");
    assert_eq!(
      value,
      json!({
        "title": "Launch party",
        "description": "Bring snacks",
        "occurrences": ["2026-09-01T18:00:00Z"],
        "duration": 3_600_000.0,
      })
    );
  }
}
