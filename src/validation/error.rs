//! Validation error values.

/// A typed validation failure.
///
/// Checks append these to an output list instead of returning early, so a
/// single validation pass can report every problem it finds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
  /// The value had a different kind than expected.
  #[error("expected {expected}, got {actual}")]
  TypeMismatch { expected: String, actual: String },

  /// NaN was supplied where a number was expected. Kept distinct from
  /// [`ValidationError::TypeMismatch`] because NaN *is* a number.
  #[error("NaN is not a valid number")]
  NaN,

  /// Every branch of a union check failed. Carries the errors from each
  /// attempted branch.
  #[error("union validation failed")]
  Union(Vec<ValidationError>),

  /// A domain-specific constraint failed.
  #[error("{0}")]
  Invalid(String),
}

impl ValidationError {
  pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
    Self::TypeMismatch {
      expected: expected.into(),
      actual: actual.into(),
    }
  }

  pub fn invalid(message: impl Into<String>) -> Self {
    Self::Invalid(message.into())
  }
}
