//! The configuration resource: a single keyed configuration flag.

use serde_json::{json, Value};

use crate::validation::ValidationError;

use super::{plain_string, require_non_empty, Resource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationResource {
  pub key: String,
}

impl Resource for ConfigurationResource {
  fn validate_self(&self) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    require_non_empty(&self.key, "key", &mut errors);
    errors
  }

  fn to_plain(&self) -> Value {
    json!({ "key": self.key })
  }

  fn from_plain(plain: &Value) -> Self {
    Self {
      key: plain_string(plain, "key"),
    }
  }

  fn unique_id(&self) -> String {
    self.key.clone()
  }
}
