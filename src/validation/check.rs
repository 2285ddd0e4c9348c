//! The structural type-checker: `check_type` and `check_union`.
//!
//! Checks operate on a borrowed [`FieldValue`] view so that in-memory field
//! values (including NaN floats, which JSON cannot represent) and raw wire
//! payloads go through the same code path.

use chrono::DateTime;
use serde_json::Value;

use super::error::ValidationError;

/// A value under validation.
///
/// `Missing` models an absent field (the `undefined` of the wire format),
/// which is distinct from an explicit `Null`.
#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
  Missing,
  Null,
  Text(&'a str),
  Number(f64),
  Bool(bool),
  List(Vec<FieldValue<'a>>),
  /// A structured payload, kept as raw JSON (objects, union-typed members).
  Json(&'a Value),
}

impl<'a> From<&'a Value> for FieldValue<'a> {
  fn from(value: &'a Value) -> Self {
    match value {
      Value::Null => Self::Null,
      Value::Bool(b) => Self::Bool(*b),
      Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
      Value::String(s) => Self::Text(s),
      Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
      Value::Object(_) => Self::Json(value),
    }
  }
}

impl<'a> FieldValue<'a> {
  /// View an optional owned string as a field value, mapping `None` to null.
  pub fn opt_text(value: &'a Option<String>) -> Self {
    match value {
      Some(s) => Self::Text(s),
      None => Self::Null,
    }
  }

  /// View an optional number as a field value, mapping `None` to null.
  pub fn opt_number(value: &Option<f64>) -> Self {
    match value {
      Some(n) => Self::Number(*n),
      None => Self::Null,
    }
  }

  /// View a slice of owned strings as a list of text values.
  pub fn text_list(items: &'a [String]) -> Self {
    Self::List(items.iter().map(|s| Self::Text(s)).collect())
  }

  /// View a slice of raw JSON values as a list.
  pub fn json_list(items: &'a [Value]) -> Self {
    Self::List(items.iter().map(Self::from).collect())
  }

  /// The kind name used on the "actual" side of mismatch errors.
  fn kind_name(&self) -> &'static str {
    match self {
      Self::Missing => "undefined",
      Self::Null => "null",
      Self::Text(_) => "string",
      Self::Number(_) => "number",
      Self::Bool(_) => "boolean",
      Self::List(_) => "array",
      Self::Json(value) => match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
      },
    }
  }
}

/// The vocabulary of checkable kinds.
///
/// Payload-carrying variants (`Enum`, `Resource`) cannot be constructed
/// without their configuration, so the "missing option" misconfiguration
/// class of a dynamic checker does not exist here.
#[derive(Clone, Copy)]
pub enum TypeKind<'a> {
  Text,
  Number,
  Bool,
  Object,
  Null,
  /// An RFC 3339 date-time string.
  DateTime,
  /// A duration as a finite, non-negative milliseconds number.
  Duration,
  /// An ISO 8601 interval: two RFC 3339 instants joined by `/`, start <= end.
  Interval,
  /// Membership in a fixed set of string values.
  Enum(&'a [&'a str]),
  /// A resource payload: must be a JSON object accepted by the supplied
  /// check. Sub-errors are flattened into the caller's list.
  Resource(fn(&Value) -> Vec<ValidationError>),
  /// Matches anything.
  Any,
}

impl TypeKind<'_> {
  /// The kind label used on the "expected" side of errors and as the
  /// matched-branch marker returned by [`check_union`].
  pub fn label(&self) -> &'static str {
    match self {
      Self::Text => "string",
      Self::Number => "number",
      Self::Bool => "boolean",
      Self::Object => "object",
      Self::Null => "null",
      Self::DateTime => "DateTime",
      Self::Duration => "Duration",
      Self::Interval => "Interval",
      Self::Enum(_) => "Enum",
      Self::Resource(_) => "Resource",
      Self::Any => "ANY",
    }
  }
}

/// Options for a single check.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
  /// Short-circuit to success when the value is exactly null.
  pub allow_null: bool,
  /// Short-circuit to success when the field is absent.
  pub allow_undefined: bool,
  /// Check element-wise: the value must be an array and every element is
  /// checked with this flag cleared.
  pub is_array: bool,
}

impl CheckOptions {
  pub const fn nullable() -> Self {
    Self {
      allow_null: true,
      allow_undefined: false,
      is_array: false,
    }
  }

  pub const fn array() -> Self {
    Self {
      allow_null: false,
      allow_undefined: false,
      is_array: true,
    }
  }
}

/// Check that `value` is of kind `kind`.
///
/// Returns true when the value is acceptable. On failure exactly one error
/// is appended to `errors` (plus flattened sub-errors for `Resource` kinds).
/// NaN fails the `Number` kind with the distinct [`ValidationError::NaN`].
pub fn check_type(
  kind: TypeKind<'_>,
  value: &FieldValue<'_>,
  errors: &mut Vec<ValidationError>,
  options: CheckOptions,
) -> bool {
  if options.allow_undefined && matches!(value, FieldValue::Missing) {
    return true;
  }
  if options.allow_null && matches!(value, FieldValue::Null) {
    return true;
  }

  if options.is_array {
    let FieldValue::List(items) = value else {
      errors.push(ValidationError::mismatch("array", value.kind_name()));
      return false;
    };
    let element_options = CheckOptions {
      is_array: false,
      ..options
    };
    // Stops at the first failing element.
    return items
      .iter()
      .all(|item| check_type(kind, item, errors, element_options));
  }

  match kind {
    TypeKind::Text => match value {
      FieldValue::Text(_) => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Number => match value {
      FieldValue::Number(n) if n.is_nan() => {
        errors.push(ValidationError::NaN);
        false
      }
      FieldValue::Number(_) => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Bool => match value {
      FieldValue::Bool(_) => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Object => match value {
      FieldValue::Json(v) if v.is_object() => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Null => match value {
      FieldValue::Null => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::DateTime => match value {
      FieldValue::Text(s) if DateTime::parse_from_rfc3339(s).is_ok() => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Duration => match value {
      FieldValue::Number(n) if n.is_finite() && *n >= 0.0 => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Interval => match value {
      FieldValue::Text(s) if is_valid_interval(s) => true,
      other => mismatch(kind, other, errors),
    },
    TypeKind::Enum(allowed) => match value {
      FieldValue::Text(s) if allowed.contains(s) => true,
      other => {
        errors.push(ValidationError::mismatch(
          format!("Enum<{}>", allowed.join(" | ")),
          other.kind_name(),
        ));
        false
      }
    },
    TypeKind::Resource(check) => match value {
      FieldValue::Json(v) if v.is_object() => {
        let sub_errors = check(v);
        if sub_errors.is_empty() {
          true
        } else {
          errors.extend(sub_errors);
          false
        }
      }
      other => mismatch(kind, other, errors),
    },
    TypeKind::Any => true,
  }
}

fn mismatch(kind: TypeKind<'_>, value: &FieldValue<'_>, errors: &mut Vec<ValidationError>) -> bool {
  errors.push(ValidationError::mismatch(kind.label(), value.kind_name()));
  false
}

fn is_valid_interval(s: &str) -> bool {
  let Some((start, end)) = s.split_once('/') else {
    return false;
  };
  match (
    DateTime::parse_from_rfc3339(start),
    DateTime::parse_from_rfc3339(end),
  ) {
    (Ok(start), Ok(end)) => start <= end,
    _ => false,
  }
}

/// One branch of a union check.
#[derive(Clone, Copy)]
pub struct UnionCheck<'a> {
  pub kind: TypeKind<'a>,
  pub options: CheckOptions,
}

impl<'a> UnionCheck<'a> {
  pub const fn of(kind: TypeKind<'a>) -> Self {
    Self {
      kind,
      options: CheckOptions {
        allow_null: false,
        allow_undefined: false,
        is_array: false,
      },
    }
  }
}

/// What a successful union check matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionMatch {
  /// The label of the branch that matched.
  One(&'static str),
  /// Element-wise mode: the matched branch label for each element in order.
  Each(Vec<&'static str>),
  Null,
  Undefined,
}

/// Try each branch in order; the first match wins.
///
/// Returns the matched kind, or `None` with exactly one
/// [`ValidationError::Union`] (wrapping every branch's errors) appended to
/// `errors` when no branch matched.
///
/// `is_array` here means: check each *element* of the value against the
/// whole union, i.e. `(string | number)[]` rather than
/// `string[] | number[]`. This is intentionally different from
/// [`check_type`]'s array handling, where the union would be a single level.
pub fn check_union(
  checks: &[UnionCheck<'_>],
  value: &FieldValue<'_>,
  errors: &mut Vec<ValidationError>,
  options: CheckOptions,
) -> Option<UnionMatch> {
  if options.allow_undefined && matches!(value, FieldValue::Missing) {
    return Some(UnionMatch::Undefined);
  }
  if options.allow_null && matches!(value, FieldValue::Null) {
    return Some(UnionMatch::Null);
  }

  if options.is_array {
    let FieldValue::List(items) = value else {
      errors.push(ValidationError::mismatch("array", value.kind_name()));
      return None;
    };
    let element_options = CheckOptions {
      is_array: false,
      ..options
    };
    let mut branch_errors = Vec::new();
    let mut matched = Vec::with_capacity(items.len());
    for item in items {
      match check_union(checks, item, &mut branch_errors, element_options) {
        Some(UnionMatch::One(label)) => matched.push(label),
        Some(UnionMatch::Null) => matched.push("null"),
        Some(UnionMatch::Undefined) => matched.push("undefined"),
        Some(UnionMatch::Each(_)) => {}
        None => {
          // branch_errors already holds a Union error for the bad element.
          errors.append(&mut branch_errors);
          return None;
        }
      }
    }
    return Some(UnionMatch::Each(matched));
  }

  let mut branch_errors = Vec::new();
  for check in checks {
    if check_type(check.kind, value, &mut branch_errors, check.options) {
      return Some(UnionMatch::One(check.kind.label()));
    }
  }
  errors.push(ValidationError::Union(branch_errors));
  None
}
