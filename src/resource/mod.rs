//! The resource codec: typed, self-validating domain objects.
//!
//! Every domain entity implements [`Resource`]: it can report its own
//! validation errors, lower itself to a structurally primitive plain object,
//! and be rebuilt from one. Reconstruction is total — an invalid instance
//! can exist transiently until `serialize` or `validate_self_or_throw` is
//! called, leaving the error-handling decision to the caller.

mod configuration;
mod event;
mod image;
mod notification;

pub use configuration::ConfigurationResource;
pub use event::EventResource;
pub use image::ImageResource;
pub use notification::{NotificationResource, NOTIFICATION_CATEGORIES};

use serde_json::Value;

use crate::validation::ValidationError;

pub trait Resource: Sized {
  /// Check the instance's fields, accumulating every problem found.
  /// This never panics and never stops at the first error.
  fn validate_self(&self) -> Vec<ValidationError>;

  /// Lower to the wire/storage representation: a structurally primitive
  /// object whose values are JSON-safe.
  fn to_plain(&self) -> Value;

  /// Rebuild from a plain object. Total and lenient — wire-variant fields
  /// are taken as-is and left for [`Resource::validate_self`] to judge.
  fn from_plain(plain: &Value) -> Self;

  /// A unique identifier for the instance, when the resource has one.
  fn unique_id(&self) -> String {
    String::from("unimplemented")
  }

  /// Validate and fail with the first reported error.
  fn validate_self_or_throw(&self) -> Result<(), ValidationError> {
    match self.validate_self().into_iter().next() {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }

  /// Validate, then lower to a plain object.
  fn serialize(&self) -> Result<Value, ValidationError> {
    self.validate_self_or_throw()?;
    Ok(self.to_plain())
  }

  /// Rebuild and validate in one step. The instance is always returned,
  /// even when invalid.
  fn deserialize(plain: &Value) -> (Self, Vec<ValidationError>) {
    let instance = Self::from_plain(plain);
    let errors = instance.validate_self();
    (instance, errors)
  }

  /// Rebuild an array, preserving input order. All element errors are
  /// aggregated into one flat list; invalid elements still produce
  /// instances.
  fn deserialize_array(plain: &[Value]) -> (Vec<Self>, Vec<ValidationError>) {
    let mut errors = Vec::new();
    let instances = plain
      .iter()
      .map(|p| {
        let (instance, instance_errors) = Self::deserialize(p);
        errors.extend(instance_errors);
        instance
      })
      .collect();
    (instances, errors)
  }

  /// Lower an array, preserving input order and collecting all errors
  /// across all elements rather than stopping at the first invalid one.
  fn serialize_array(instances: &[Self]) -> (Vec<Value>, Vec<ValidationError>) {
    let mut errors = Vec::new();
    let plain = instances
      .iter()
      .map(|instance| {
        errors.extend(instance.validate_self());
        instance.to_plain()
      })
      .collect();
    (plain, errors)
  }

  /// Validate a raw plain object without keeping the instance. This is the
  /// checker handed to [`crate::validation::TypeKind::Resource`].
  fn check_plain(plain: &Value) -> Vec<ValidationError> {
    Self::deserialize(plain).1
  }
}

/// Extract a required string field. Mistyped scalars are kept as their raw
/// JSON rendering; missing and null become the empty string, which the
/// resource's required-field check then reports.
pub(crate) fn plain_string(plain: &Value, key: &str) -> String {
  match plain.get(key) {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Null) | None => String::new(),
    Some(other) => other.to_string(),
  }
}

/// Report a required string field that came through empty.
pub(crate) fn require_non_empty(value: &str, field: &str, errors: &mut Vec<ValidationError>) {
  if value.is_empty() {
    errors.push(ValidationError::invalid(format!(
      "{field} must be a non-empty string"
    )));
  }
}

/// Extract an optional string field; explicit null and absence both map to
/// `None`.
pub(crate) fn plain_opt_string(plain: &Value, key: &str) -> Option<String> {
  plain.get(key).and_then(Value::as_str).map(String::from)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_deserialize_array_preserves_order_and_keeps_invalid_instances() {
    let plains = vec![
      json!({"key": "first"}),
      json!({"key": null}),
      json!({"key": "third"}),
    ];
    let (instances, errors) = ConfigurationResource::deserialize_array(&plains);

    assert_eq!(instances.len(), 3);
    assert_eq!(instances[0].key, "first");
    // The invalid element is kept, in position, not dropped.
    assert_eq!(instances[1].key, "");
    assert_eq!(instances[2].key, "third");
    assert_eq!(errors.len(), 1);
  }

  #[test]
  fn test_serialize_array_collects_errors_without_dropping_elements() {
    let instances = vec![
      ConfigurationResource {
        key: String::from("a"),
      },
      ConfigurationResource { key: String::new() },
    ];
    let (plain, errors) = ConfigurationResource::serialize_array(&instances);
    assert_eq!(plain.len(), 2);
    assert_eq!(errors.len(), 1);
  }

  #[test]
  fn test_default_unique_id() {
    struct Bare;
    impl Resource for Bare {
      fn validate_self(&self) -> Vec<crate::validation::ValidationError> {
        Vec::new()
      }
      fn to_plain(&self) -> Value {
        json!({})
      }
      fn from_plain(_: &Value) -> Self {
        Self
      }
    }
    assert_eq!(Bare.unique_id(), "unimplemented");
  }
}
