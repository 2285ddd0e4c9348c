//! The wire response model and its classifier predicates.
//!
//! Every payload from the server is a JSON object discriminated by an `ok`
//! boolean. Consumers must narrow through the predicates here before
//! touching `data` or the error fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// Response types
// ============================================================================

/// An action the server instructs the client to perform. Unknown actions are
/// preserved rather than dropped so newer servers can talk to older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientAction {
  Logout,
  Other(String),
}

impl From<String> for ClientAction {
  fn from(value: String) -> Self {
    match value.as_str() {
      "logout" => Self::Logout,
      _ => Self::Other(value),
    }
  }
}

impl From<ClientAction> for String {
  fn from(action: ClientAction) -> Self {
    match action {
      ClientAction::Logout => Self::from("logout"),
      ClientAction::Other(value) => value,
    }
  }
}

/// The pagination settings the server used to generate a paginated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
  /// The current page number (1-indexed).
  pub page: u64,
  /// The number of items per page.
  pub page_size: u64,
  /// The total number of items.
  pub total: u64,
}

/// The structured error payload of an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
  /// Short human-readable message, not necessarily user-friendly.
  pub error_message: String,
  /// Longer human-readable details.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_details: Option<String>,
  /// User-friendly explanation; if present it should be shown to the user.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_explanation: Option<String>,
  /// The original cause, for programmatic handling. Never shown to users.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error_cause: Option<Value>,
}

impl ApiError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error_message: message.into(),
      error_details: None,
      error_explanation: None,
      error_cause: None,
    }
  }
}

/// A successful response. `data` is the opaque payload; `pagination` and
/// `id` are only present on the paginated and created variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OkApiResponse {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub client_actions: Vec<ClientAction>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pagination: Option<PaginationInfo>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
}

/// A classified response: either ok or error, discriminated by `ok`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
  Ok(OkApiResponse),
  Error(ApiError),
}

// ============================================================================
// Classifier predicates
// ============================================================================

/// Whether the raw body has the shape of a successful response.
pub fn is_ok_api_response(body: &Value) -> bool {
  body.is_object() && body.get("ok").and_then(Value::as_bool) == Some(true)
}

/// Whether the raw body has the shape of an error response.
pub fn is_error_api_response(body: &Value) -> bool {
  body.is_object()
    && body.get("ok").and_then(Value::as_bool) == Some(false)
    && body.get("errorMessage").is_some_and(Value::is_string)
}

/// Whether the response carries a single (or no) resource payload.
pub fn is_singular_ok_api_response(response: &OkApiResponse) -> bool {
  !response.data.as_ref().is_some_and(Value::is_array)
}

/// Whether the response carries an array payload.
pub fn is_array_ok_api_response(response: &OkApiResponse) -> bool {
  response.data.as_ref().is_some_and(Value::is_array)
}

/// Whether the response reports a created resource (carries its id).
pub fn is_created_api_response(response: &OkApiResponse) -> bool {
  response.id.is_some()
}

/// Whether the response is paginated.
pub fn is_paginated_api_response(response: &OkApiResponse) -> bool {
  response.pagination.is_some() && is_array_ok_api_response(response)
}

/// The response shape a caller expects from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
  #[default]
  Any,
  Singular,
  Array,
  Created,
  Paginated,
}

impl ResponseShape {
  pub fn matches(self, response: &OkApiResponse) -> bool {
    match self {
      Self::Any => true,
      Self::Singular => is_singular_ok_api_response(response),
      Self::Array => is_array_ok_api_response(response),
      Self::Created => is_created_api_response(response),
      Self::Paginated => is_paginated_api_response(response),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Any => "any",
      Self::Singular => "singular ok",
      Self::Array => "array ok",
      Self::Created => "created",
      Self::Paginated => "paginated",
    }
  }
}

// ============================================================================
// Response constructors
// ============================================================================

/// Build a raw ok response body.
pub fn ok_response_from(value: Option<Value>) -> Value {
  let mut response = json!({ "ok": true });
  if let (Some(value), Some(map)) = (value, response.as_object_mut()) {
    map.insert(String::from("data"), value);
  }
  response
}

/// Build a raw created response body.
pub fn created_response_from(value: Option<Value>, id: &str) -> Value {
  let mut response = ok_response_from(value);
  if let Some(map) = response.as_object_mut() {
    map.insert(String::from("id"), Value::String(String::from(id)));
  }
  response
}

/// Build a raw paginated response body.
pub fn paginated_response_from(values: Vec<Value>, pagination: PaginationInfo) -> Value {
  let mut response = ok_response_from(Some(Value::Array(values)));
  if let (Some(map), Ok(pagination)) = (
    response.as_object_mut(),
    serde_json::to_value(pagination),
  ) {
    map.insert(String::from("pagination"), pagination);
  }
  response
}

/// Build a raw error response body.
pub fn error_response_from(error: &ApiError) -> Value {
  let mut response = json!({ "ok": false });
  if let (Some(map), Ok(Value::Object(fields))) =
    (response.as_object_mut(), serde_json::to_value(error))
  {
    map.extend(fields);
  }
  response
}
