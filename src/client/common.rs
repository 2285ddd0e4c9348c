//! Shared response handling: classification, error narrowing and typed
//! payload deserialization.

use serde_json::Value;

use crate::error::ApiClientError;
use crate::resource::Resource;
use crate::response::{
  is_error_api_response, is_ok_api_response, ApiError, ApiResponse, ClientAction, OkApiResponse,
  PaginationInfo,
};
use crate::transport::TransportResponse;
use crate::validation::ValidationError;

/// Classify a parsed body into an ok or error response.
///
/// A body that is neither shape is malformed, whatever its status code was.
pub fn classify_body(body: &Value) -> Result<ApiResponse, ApiClientError> {
  if is_error_api_response(body) {
    let error: ApiError = serde_json::from_value(body.clone())
      .map_err(|e| ApiClientError::MalformedResponse(format!("bad error response: {e}")))?;
    return Ok(ApiResponse::Error(error));
  }

  if is_ok_api_response(body) {
    let ok: OkApiResponse = serde_json::from_value(body.clone())
      .map_err(|e| ApiClientError::MalformedResponse(format!("bad ok response: {e}")))?;
    return Ok(ApiResponse::Ok(ok));
  }

  Err(ApiClientError::MalformedResponse(String::from(
    "response body is neither an ok nor an error response",
  )))
}

/// Extract the classified response from a transport response, or the
/// appropriate error.
///
/// A non-2xx status with an error-shaped body surfaces as
/// [`ApiClientError::ErrorResponse`]; any other non-2xx becomes
/// [`ApiClientError::Http`]. A 2xx body that fails to parse as JSON is
/// malformed. The raw body comes back alongside the classification so
/// callers can store it.
pub fn response_body_or_error(
  response: &TransportResponse,
) -> Result<(ApiResponse, Value), ApiClientError> {
  if !response.ok() {
    if let Ok(body) = response.json() {
      if is_error_api_response(&body) {
        if let Ok(ApiResponse::Error(error)) = classify_body(&body) {
          return Err(ApiClientError::ErrorResponse(error));
        }
      }
    }
    return Err(ApiClientError::Http {
      status: response.status,
      message: response.status_text.clone(),
    });
  }

  let body = response
    .json()
    .map_err(|e| ApiClientError::MalformedResponse(format!("response body is not JSON: {e}")))?;
  let classified = classify_body(&body)?;
  Ok((classified, body))
}

/// Narrow a classified response to its ok variant, surfacing a server error
/// as [`ApiClientError::ErrorResponse`].
pub fn check_and_handle_error(response: ApiResponse) -> Result<OkApiResponse, ApiClientError> {
  match response {
    ApiResponse::Ok(ok) => Ok(ok),
    ApiResponse::Error(error) => Err(ApiClientError::ErrorResponse(error)),
  }
}

fn raise_first(errors: Vec<ValidationError>) -> Result<(), ApiClientError> {
  match errors.into_iter().next() {
    Some(error) => Err(ApiClientError::Deserialization(error)),
    None => Ok(()),
  }
}

/// A singular response with its payload decoded.
#[derive(Debug)]
pub struct DeserializedResource<R> {
  pub resource: R,
  pub client_actions: Vec<ClientAction>,
}

/// An array response with its payload decoded.
#[derive(Debug)]
pub struct DeserializedArray<R> {
  pub resources: Vec<R>,
  pub client_actions: Vec<ClientAction>,
}

/// A created response: the new resource's id, and its representation when
/// the server echoed one back.
#[derive(Debug)]
pub struct CreatedResource<R> {
  pub created_resource_id: String,
  pub resource: Option<R>,
  pub client_actions: Vec<ClientAction>,
}

/// A paginated response with its payload decoded.
#[derive(Debug)]
pub struct PaginatedResources<R> {
  pub resources: Vec<R>,
  pub pagination: PaginationInfo,
  pub client_actions: Vec<ClientAction>,
}

/// Decode the payload of a singular response. The first validation error
/// fails the whole call.
pub fn deserialize_resource<R: Resource>(
  response: OkApiResponse,
) -> Result<DeserializedResource<R>, ApiClientError> {
  let data = response.data.ok_or(ApiClientError::UnexpectedShape {
    expected: "singular ok",
  })?;
  let (resource, errors) = R::deserialize(&data);
  raise_first(errors)?;
  Ok(DeserializedResource {
    resource,
    client_actions: response.client_actions,
  })
}

fn data_as_array(data: Option<Value>) -> Result<Vec<Value>, ApiClientError> {
  match data {
    Some(Value::Array(values)) => Ok(values),
    _ => Err(ApiClientError::UnexpectedShape {
      expected: "array ok",
    }),
  }
}

/// Decode the payload of an array response.
pub fn deserialize_array<R: Resource>(
  response: OkApiResponse,
) -> Result<DeserializedArray<R>, ApiClientError> {
  let values = data_as_array(response.data)?;
  let (resources, errors) = R::deserialize_array(&values);
  raise_first(errors)?;
  Ok(DeserializedArray {
    resources,
    client_actions: response.client_actions,
  })
}

/// Decode a created response. The payload is optional.
pub fn deserialize_created<R: Resource>(
  response: OkApiResponse,
) -> Result<CreatedResource<R>, ApiClientError> {
  let created_resource_id = response
    .id
    .ok_or(ApiClientError::UnexpectedShape { expected: "created" })?;

  let resource = match response.data {
    Some(data) => {
      let (resource, errors) = R::deserialize(&data);
      raise_first(errors)?;
      Some(resource)
    }
    None => None,
  };

  Ok(CreatedResource {
    created_resource_id,
    resource,
    client_actions: response.client_actions,
  })
}

/// Decode a paginated response.
pub fn deserialize_paginated<R: Resource>(
  response: OkApiResponse,
) -> Result<PaginatedResources<R>, ApiClientError> {
  let pagination = response
    .pagination
    .ok_or(ApiClientError::UnexpectedShape { expected: "paginated" })?;
  let values = data_as_array(response.data)?;
  let (resources, errors) = R::deserialize_array(&values);
  raise_first(errors)?;
  Ok(PaginatedResources {
    resources,
    pagination,
    client_actions: response.client_actions,
  })
}
