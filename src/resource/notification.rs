//! The notification resource.

use serde_json::{json, Value};

use crate::validation::{check_type, CheckOptions, FieldValue, TypeKind, ValidationError};

use super::{plain_string, require_non_empty, Resource};

/// The categories a notification may carry.
pub const NOTIFICATION_CATEGORIES: &[&str] = &["info", "alert", "reminder"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResource {
  pub notification_id: String,
  pub title: String,
  pub body: String,
  pub category: String,
  /// RFC 3339 send timestamp, kept in wire form.
  pub sent_at: String,
}

impl Resource for NotificationResource {
  fn validate_self(&self) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&self.notification_id, "notificationId", &mut errors);
    require_non_empty(&self.title, "title", &mut errors);
    require_non_empty(&self.body, "body", &mut errors);
    check_type(
      TypeKind::Enum(NOTIFICATION_CATEGORIES),
      &FieldValue::Text(&self.category),
      &mut errors,
      CheckOptions::default(),
    );
    check_type(
      TypeKind::DateTime,
      &FieldValue::Text(&self.sent_at),
      &mut errors,
      CheckOptions::default(),
    );
    errors
  }

  fn to_plain(&self) -> Value {
    json!({
      "notificationId": self.notification_id,
      "title": self.title,
      "body": self.body,
      "category": self.category,
      "sentAt": self.sent_at,
    })
  }

  fn from_plain(plain: &Value) -> Self {
    Self {
      notification_id: plain_string(plain, "notificationId"),
      title: plain_string(plain, "title"),
      body: plain_string(plain, "body"),
      category: plain_string(plain, "category"),
      sent_at: plain_string(plain, "sentAt"),
    }
  }

  fn unique_id(&self) -> String {
    self.notification_id.clone()
  }
}
