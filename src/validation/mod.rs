//! Runtime validation of wire payloads and domain resources.
//!
//! This module provides a small structural type-checker over a fixed
//! vocabulary of kinds. Checks never panic on bad input; failures accumulate
//! as [`ValidationError`] values in a caller-supplied list.

mod check;
mod error;
mod primitive;

pub use check::{check_type, check_union, CheckOptions, FieldValue, TypeKind, UnionCheck, UnionMatch};
pub use error::ValidationError;
pub use primitive::{is_primitive, is_primitive_object};
