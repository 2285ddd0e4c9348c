//! The image resource.

use serde_json::{json, Value};

use crate::validation::{check_type, CheckOptions, FieldValue, TypeKind, ValidationError};

use super::{plain_opt_string, plain_string, require_non_empty, Resource};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
  pub image_id: String,
  pub url: String,
  /// Pixel dimensions, kept as wire numbers so a NaN smuggled in through
  /// direct construction is caught by validation rather than serialized.
  pub width: f64,
  pub height: f64,
  pub alt: Option<String>,
  pub thumb_hash: Option<String>,
}

impl Resource for ImageResource {
  fn validate_self(&self) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&self.image_id, "imageId", &mut errors);
    require_non_empty(&self.url, "url", &mut errors);
    check_type(
      TypeKind::Number,
      &FieldValue::Number(self.width),
      &mut errors,
      CheckOptions::default(),
    );
    check_type(
      TypeKind::Number,
      &FieldValue::Number(self.height),
      &mut errors,
      CheckOptions::default(),
    );
    check_type(
      TypeKind::Text,
      &FieldValue::opt_text(&self.alt),
      &mut errors,
      CheckOptions::nullable(),
    );
    check_type(
      TypeKind::Text,
      &FieldValue::opt_text(&self.thumb_hash),
      &mut errors,
      CheckOptions::nullable(),
    );
    errors
  }

  fn to_plain(&self) -> Value {
    json!({
      "imageId": self.image_id,
      "url": self.url,
      "width": self.width,
      "height": self.height,
      "alt": self.alt,
      "thumbHash": self.thumb_hash,
    })
  }

  fn from_plain(plain: &Value) -> Self {
    Self {
      image_id: plain_string(plain, "imageId"),
      url: plain_string(plain, "url"),
      width: plain.get("width").and_then(Value::as_f64).unwrap_or(f64::NAN),
      height: plain
        .get("height")
        .and_then(Value::as_f64)
        .unwrap_or(f64::NAN),
      alt: plain_opt_string(plain, "alt"),
      thumb_hash: plain_opt_string(plain, "thumbHash"),
    }
  }

  fn unique_id(&self) -> String {
    self.image_id.clone()
  }
}
