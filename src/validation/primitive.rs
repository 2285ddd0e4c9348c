//! Guards for values that may be safely cached as JSON text.

use serde_json::Value;

/// Whether the value is a JSON primitive: string, number, boolean or null.
pub fn is_primitive(value: &Value) -> bool {
  matches!(
    value,
    Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
  )
}

/// Whether the value is a structurally primitive object: an object or array
/// whose members are primitives, or nested primitive objects, all the way
/// down. Only these values round-trip losslessly through JSON text, so only
/// these values are accepted by the cache store.
pub fn is_primitive_object(value: &Value) -> bool {
  match value {
    Value::Object(map) => map.values().all(is_primitive_safe),
    Value::Array(items) => items.iter().all(is_primitive_safe),
    _ => false,
  }
}

fn is_primitive_safe(value: &Value) -> bool {
  is_primitive(value) || is_primitive_object(value)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_primitives() {
    assert!(is_primitive(&json!("a")));
    assert!(is_primitive(&json!(1.5)));
    assert!(is_primitive(&json!(true)));
    assert!(is_primitive(&json!(null)));
    assert!(!is_primitive(&json!({})));
    assert!(!is_primitive(&json!([])));
  }

  #[test]
  fn test_primitive_object_accepts_nested_structures() {
    assert!(is_primitive_object(&json!({})));
    assert!(is_primitive_object(&json!({"a": 1, "b": [true, null]})));
    assert!(is_primitive_object(&json!({"a": {"b": {"c": "deep"}}})));
    assert!(is_primitive_object(&json!([{"a": 1}, {"b": 2}])));
  }

  #[test]
  fn test_primitive_object_rejects_scalars() {
    assert!(!is_primitive_object(&json!("a")));
    assert!(!is_primitive_object(&json!(42)));
    assert!(!is_primitive_object(&json!(null)));
  }
}
