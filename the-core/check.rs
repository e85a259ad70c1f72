//! Runtime type assertions.
//!
//! [`assert_type`] is the one entry point: it classifies a value, compares it
//! against an [`Expected`] type and reports a [`TypeError`] that carries the
//! inspected value, so the message is useful without a debugger.
//!
//! ```ignore
//! use the_core::{Expected, TypeTag, Value, assert_type};
//!
//! assert_type(&Value::from(3), TypeTag::Integer, false)?;
//! assert_type(&Value::from(3), Expected::Natural, false)?;
//! assert_type(&Value::Nil, TypeTag::String, true)?; // optional, nil is fine
//! ```

use std::fmt;

use thiserror::Error;

use crate::{
  inspect::inspect,
  tag::{
    TypeTag,
    classify,
  },
  value::Value,
};

pub type Result<T> = std::result::Result<T, TypeError>;

/// What an assertion asks for.
///
/// The numeric refinements are derived from the `integer` classification and
/// are only ever checked when requested explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expected {
  Tag(TypeTag),
  /// Integer or float.
  Number,
  /// Positive integer.
  Natural,
  Zero,
  NonNegativeInteger,
  NegativeInteger,
}

impl Expected {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Tag(tag) => tag.as_str(),
      Self::Number => "number",
      Self::Natural => "natural",
      Self::Zero => "zero",
      Self::NonNegativeInteger => "non_negative_integer",
      Self::NegativeInteger => "negative_integer",
    }
  }

  pub fn matches(self, value: &Value) -> bool {
    let tag = classify(value);
    let integer = || value.as_number().filter(|_| tag == TypeTag::Integer);
    match self {
      Self::Tag(expected) => tag == expected,
      Self::Number => tag.is_numeric(),
      Self::Natural => integer().is_some_and(|n| n > 0.0),
      Self::Zero => integer().is_some_and(|n| n == 0.0),
      Self::NonNegativeInteger => integer().is_some_and(|n| n >= 0.0),
      Self::NegativeInteger => integer().is_some_and(|n| n < 0.0),
    }
  }
}

impl From<TypeTag> for Expected {
  fn from(tag: TypeTag) -> Self {
    Self::Tag(tag)
  }
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got {actual}: {value}")]
pub struct TypeError {
  /// Inspected rendering of the offending value.
  pub value:    String,
  pub expected: Expected,
  pub actual:   TypeTag,
}

impl TypeError {
  pub fn new(value: &Value, expected: impl Into<Expected>) -> Self {
    Self {
      value:    inspect(value),
      expected: expected.into(),
      actual:   classify(value),
    }
  }
}

/// Check that `value` has the `expected` type.
///
/// With `optional` set a `nil` value passes regardless of `expected`.
pub fn assert_type(value: &Value, expected: impl Into<Expected>, optional: bool) -> Result<()> {
  let expected = expected.into();
  if (optional && value.is_nil()) || expected.matches(value) {
    Ok(())
  } else {
    Err(TypeError::new(value, expected))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::value::Table;

  #[test]
  fn matching_types_pass() {
    assert_eq!(assert_type(&3.into(), TypeTag::Integer, false), Ok(()));
    assert_eq!(assert_type(&3.5.into(), TypeTag::Float, false), Ok(()));
    assert_eq!(assert_type(&"s".into(), TypeTag::String, false), Ok(()));
    assert_eq!(
      assert_type(&Value::array(vec![1.into()]), TypeTag::Array, false),
      Ok(())
    );
  }

  #[test]
  fn mismatch_reports_value_and_tags() {
    let err = assert_type(&"abc".into(), TypeTag::Integer, false).unwrap_err();
    assert_eq!(err.expected, Expected::Tag(TypeTag::Integer));
    assert_eq!(err.actual, TypeTag::String);
    assert_eq!(err.to_string(), r#"expected integer, got string: "abc""#);

    let err = assert_type(&Table::new().into(), TypeTag::Array, false).unwrap_err();
    assert_eq!(err.to_string(), "expected array, got table: {}");
  }

  #[test]
  fn optional_accepts_nil_only() {
    assert_eq!(assert_type(&Value::Nil, TypeTag::String, true), Ok(()));
    assert!(assert_type(&Value::Nil, TypeTag::String, false).is_err());
    assert!(assert_type(&1.into(), TypeTag::String, true).is_err());
  }

  #[test]
  fn numeric_refinements() {
    let cases: [(Value, [bool; 5]); 5] = [
      // number, natural, zero, non_negative, negative
      (3.into(), [true, true, false, true, false]),
      (0.into(), [true, false, true, true, false]),
      ((-4).into(), [true, false, false, false, true]),
      (2.5.into(), [true, false, false, false, false]),
      ("1".into(), [false, false, false, false, false]),
    ];
    let expected = [
      Expected::Number,
      Expected::Natural,
      Expected::Zero,
      Expected::NonNegativeInteger,
      Expected::NegativeInteger,
    ];
    for (value, results) in cases {
      for (expected, result) in expected.into_iter().zip(results) {
        assert_eq!(
          expected.matches(&value),
          result,
          "{expected} against {}",
          inspect(&value)
        );
      }
    }
  }

  #[test]
  fn refinement_error_names_the_refinement() {
    let err = assert_type(&0.into(), Expected::Natural, false).unwrap_err();
    assert_eq!(err.to_string(), "expected natural, got integer: 0");
  }
}
