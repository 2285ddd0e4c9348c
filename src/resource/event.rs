//! The event resource.
//!
//! Timestamps stay in their RFC 3339 wire form and are validated
//! dynamically; `images` is a union-typed array (image references by id, or
//! embedded image objects) kept as raw JSON and checked element-wise.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::validation::{
  check_type, check_union, CheckOptions, FieldValue, TypeKind, UnionCheck, ValidationError,
};

use super::{plain_opt_string, plain_string, require_non_empty, ImageResource, Resource};

#[derive(Debug, Clone, PartialEq)]
pub struct EventResource {
  pub event_id: String,
  pub title: String,
  pub summary: Option<String>,
  pub description: Option<String>,
  pub location: Option<String>,
  /// RFC 3339 instants at which the event occurs.
  pub occurrences: Vec<String>,
  /// Event length in milliseconds.
  pub duration: Option<f64>,
  /// Each element is either a string image id or an embedded image object.
  pub images: Vec<Value>,
}

impl EventResource {
  /// The occurrences that parse as timestamps, in input order. Call
  /// [`Resource::validate_self`] first if you need to know about bad ones.
  pub fn occurrence_times(&self) -> Vec<DateTime<Utc>> {
    self
      .occurrences
      .iter()
      .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
      .map(|dt| dt.with_timezone(&Utc))
      .collect()
  }
}

impl Resource for EventResource {
  fn validate_self(&self) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&self.event_id, "eventId", &mut errors);
    require_non_empty(&self.title, "title", &mut errors);
    check_type(
      TypeKind::Text,
      &FieldValue::opt_text(&self.summary),
      &mut errors,
      CheckOptions::nullable(),
    );
    check_type(
      TypeKind::Text,
      &FieldValue::opt_text(&self.description),
      &mut errors,
      CheckOptions::nullable(),
    );
    check_type(
      TypeKind::Text,
      &FieldValue::opt_text(&self.location),
      &mut errors,
      CheckOptions::nullable(),
    );
    check_type(
      TypeKind::DateTime,
      &FieldValue::text_list(&self.occurrences),
      &mut errors,
      CheckOptions::array(),
    );
    check_type(
      TypeKind::Duration,
      &FieldValue::opt_number(&self.duration),
      &mut errors,
      CheckOptions::nullable(),
    );
    check_union(
      &[
        UnionCheck::of(TypeKind::Text),
        UnionCheck::of(TypeKind::Resource(ImageResource::check_plain)),
      ],
      &FieldValue::json_list(&self.images),
      &mut errors,
      CheckOptions::array(),
    );
    errors
  }

  fn to_plain(&self) -> Value {
    json!({
      "eventId": self.event_id,
      "title": self.title,
      "summary": self.summary,
      "description": self.description,
      "location": self.location,
      "occurrences": self.occurrences,
      "duration": self.duration,
      "images": self.images,
    })
  }

  fn from_plain(plain: &Value) -> Self {
    let occurrences = plain
      .get("occurrences")
      .and_then(Value::as_array)
      .map(|items| {
        items
          .iter()
          .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
          })
          .collect()
      })
      .unwrap_or_default();

    let duration = match plain.get("duration") {
      None | Some(Value::Null) => None,
      Some(v) => Some(v.as_f64().unwrap_or(f64::NAN)),
    };

    Self {
      event_id: plain_string(plain, "eventId"),
      title: plain_string(plain, "title"),
      summary: plain_opt_string(plain, "summary"),
      description: plain_opt_string(plain, "description"),
      location: plain_opt_string(plain, "location"),
      occurrences,
      duration,
      images: plain
        .get("images")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default(),
    }
  }

  fn unique_id(&self) -> String {
    self.event_id.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_event() -> EventResource {
    EventResource {
      event_id: String::from("ev-1"),
      title: String::from("Winter showcase"),
      summary: Some(String::from("An evening of demos")),
      description: None,
      location: Some(String::from("Main hall")),
      occurrences: vec![
        String::from("2026-02-01T18:00:00Z"),
        String::from("2026-02-02T18:00:00Z"),
      ],
      duration: Some(2.0 * 60.0 * 60.0 * 1000.0),
      images: vec![
        json!("img-1"),
        json!({
          "imageId": "img-2",
          "url": "https://cdn.example.com/img-2.png",
          "width": 640.0,
          "height": 480.0,
          "alt": null,
          "thumbHash": null,
        }),
      ],
    }
  }

  #[test]
  fn test_round_trip_is_idempotent() {
    let event = valid_event();
    let plain = event.serialize().expect("valid");
    let (rebuilt, errors) = EventResource::deserialize(&plain);
    assert!(errors.is_empty());
    assert_eq!(rebuilt.serialize().expect("still valid"), plain);
  }

  #[test]
  fn test_bad_occurrence_is_reported() {
    let mut event = valid_event();
    event.occurrences.push(String::from("not a timestamp"));
    let errors = event.validate_self();
    assert_eq!(
      errors,
      vec![ValidationError::mismatch("DateTime", "string")]
    );
  }

  #[test]
  fn test_image_union_rejects_other_shapes() {
    let mut event = valid_event();
    event.images.push(json!(17));
    let errors = event.validate_self();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ValidationError::Union(_)));
  }

  #[test]
  fn test_embedded_invalid_image_fails_the_union() {
    let mut event = valid_event();
    // An object that is not a valid image: the Resource branch reports it.
    event.images.push(json!({"imageId": "img-3"}));
    let errors = event.validate_self();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ValidationError::Union(_)));
  }

  #[test]
  fn test_occurrence_times_parses_valid_entries() {
    let event = valid_event();
    assert_eq!(event.occurrence_times().len(), 2);
  }

  #[test]
  fn test_deserialize_keeps_invalid_instance() {
    let plain = json!({
      "eventId": "ev-9",
      "title": "Broken",
      "occurrences": ["soon"],
      "images": [],
    });
    let (event, errors) = EventResource::deserialize(&plain);
    assert_eq!(event.event_id, "ev-9");
    assert!(!errors.is_empty());
  }
}
