//! Error taxonomy for the API client.
//!
//! Every failure a caller can observe is one of these variants; the client
//! either returns a fully valid typed value or one of these errors, never a
//! partially decoded object.

use crate::response::ApiError;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
  /// Non-2xx response whose body was not a well-formed error response.
  /// Carries the HTTP status code and status text.
  #[error("HTTP {status}: {message}")]
  Http { status: u16, message: String },

  /// 2xx response whose body failed JSON parsing or the ok-shape check.
  #[error("malformed response: {0}")]
  MalformedResponse(String),

  /// The body was a well-formed error response from the server.
  #[error("{}", .0.error_message)]
  ErrorResponse(ApiError),

  /// The response was well-formed but the payload failed resource
  /// validation. Carries the first validation error.
  #[error("deserialization failed: {0}")]
  Deserialization(ValidationError),

  /// The underlying transport failed before a response was produced.
  #[error("transport error: {0}")]
  Transport(String),

  /// The response passed classification but did not match the shape the
  /// caller asked for.
  #[error("response did not match expected type: expected {expected} response")]
  UnexpectedShape { expected: &'static str },
}

impl ApiClientError {
  /// The structured error payload, when the server sent one.
  pub fn api_error(&self) -> Option<&ApiError> {
    match self {
      Self::ErrorResponse(err) => Some(err),
      _ => None,
    }
  }
}
