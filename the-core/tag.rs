use std::fmt;

use crate::value::{
  Value,
  is_integral,
};

/// Semantic type of a [`Value`].
///
/// This is finer than the variant: numbers split into integers and floats,
/// and tables split into arrays and general tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
  Nil,
  Boolean,
  Integer,
  Float,
  String,
  Function,
  Userdata,
  Thread,
  Table,
  Array,
}

impl TypeTag {
  pub const ALL: [TypeTag; 10] = [
    TypeTag::Nil,
    TypeTag::Boolean,
    TypeTag::Integer,
    TypeTag::Float,
    TypeTag::String,
    TypeTag::Function,
    TypeTag::Userdata,
    TypeTag::Thread,
    TypeTag::Table,
    TypeTag::Array,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Nil => "nil",
      Self::Boolean => "boolean",
      Self::Integer => "integer",
      Self::Float => "float",
      Self::String => "string",
      Self::Function => "function",
      Self::Userdata => "userdata",
      Self::Thread => "thread",
      Self::Table => "table",
      Self::Array => "array",
    }
  }

  pub fn is_numeric(self) -> bool {
    matches!(self, Self::Integer | Self::Float)
  }

  /// Whether `value` may be stored where this tag is expected.
  ///
  /// Stricter tags widen in two places: a float slot takes any number, since
  /// whole floats classify as integers, and an array slot takes the empty
  /// table, which classifies as a plain table.
  pub fn admits(self, value: &Value) -> bool {
    match (self, value) {
      (Self::Float, Value::Number(_)) => true,
      (Self::Array, Value::Table(table)) => table.is_empty() || table.is_array(),
      _ => classify(value) == self,
    }
  }

  /// The value a freshly filled slot of this type starts with.
  ///
  /// Handles have no sensible default and `nil` cannot be stored, so those
  /// return `None`.
  pub fn zero_value(self) -> Option<Value> {
    match self {
      Self::Boolean => Some(Value::Boolean(false)),
      Self::Integer => Some(Value::Number(0.0)),
      Self::Float => Some(Value::Number(0.0)),
      Self::String => Some(Value::String(String::new())),
      Self::Table | Self::Array => Some(Value::Table(Default::default())),
      Self::Nil | Self::Function | Self::Userdata | Self::Thread => None,
    }
  }
}

impl fmt::Display for TypeTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub fn classify(value: &Value) -> TypeTag {
  match value {
    Value::Nil => TypeTag::Nil,
    Value::Boolean(_) => TypeTag::Boolean,
    Value::Number(n) if is_integral(*n) => TypeTag::Integer,
    Value::Number(_) => TypeTag::Float,
    Value::String(_) => TypeTag::String,
    Value::Function(_) => TypeTag::Function,
    Value::Userdata(_) => TypeTag::Userdata,
    Value::Thread(_) => TypeTag::Thread,
    Value::Table(table) if table.is_array() => TypeTag::Array,
    Value::Table(_) => TypeTag::Table,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::value::{
    Handle,
    Table,
  };

  #[test]
  fn classify_scalars() {
    assert_eq!(classify(&Value::Nil), TypeTag::Nil);
    assert_eq!(classify(&true.into()), TypeTag::Boolean);
    assert_eq!(classify(&3.into()), TypeTag::Integer);
    assert_eq!(classify(&3.0.into()), TypeTag::Integer);
    assert_eq!(classify(&(-2).into()), TypeTag::Integer);
    assert_eq!(classify(&3.5.into()), TypeTag::Float);
    assert_eq!(classify(&f64::NAN.into()), TypeTag::Float);
    assert_eq!(classify(&f64::INFINITY.into()), TypeTag::Float);
    assert_eq!(classify(&"x".into()), TypeTag::String);
    assert_eq!(classify(&Value::Function(Handle::new(1))), TypeTag::Function);
    assert_eq!(classify(&Value::Userdata(Handle::new(2))), TypeTag::Userdata);
    assert_eq!(classify(&Value::Thread(Handle::new(3))), TypeTag::Thread);
  }

  #[test]
  fn classify_tables() {
    assert_eq!(classify(&Table::new().into()), TypeTag::Table);
    assert_eq!(
      classify(&Value::array(vec![1.into(), 2.into(), 3.into()])),
      TypeTag::Array
    );

    let mut record = Table::new();
    record.insert("a", 1.into());
    assert_eq!(classify(&record.into()), TypeTag::Table);

    let mut holes = Table::new();
    holes.insert(1, 1.into());
    holes.insert(2, 2.into());
    holes.insert(4, 4.into());
    assert_eq!(classify(&holes.into()), TypeTag::Table);
  }

  #[test]
  fn zero_values_are_admitted() {
    for tag in TypeTag::ALL {
      if let Some(zero) = tag.zero_value() {
        assert!(tag.admits(&zero), "{tag} rejects its own zero value");
      }
    }
  }

  #[test]
  fn admits_widens_float_and_array() {
    assert!(TypeTag::Float.admits(&2.0.into()));
    assert!(TypeTag::Float.admits(&2.5.into()));
    assert!(!TypeTag::Integer.admits(&2.5.into()));
    assert!(!TypeTag::Float.admits(&"2.5".into()));

    assert!(TypeTag::Array.admits(&Table::new().into()));
    assert!(TypeTag::Array.admits(&Value::array(vec![true.into()])));
    let mut record = Table::new();
    record.insert("k", 1.into());
    assert!(!TypeTag::Array.admits(&record.clone().into()));
    assert!(TypeTag::Table.admits(&record.into()));
    assert!(!TypeTag::Table.admits(&Value::array(vec![true.into()])));
  }

  quickcheck::quickcheck! {
    fn integers_never_classify_as_float(n: i32) -> bool {
      classify(&n.into()) == TypeTag::Integer
    }

    fn halves_classify_as_float(n: i32) -> bool {
      classify(&(f64::from(n) + 0.5).into()) == TypeTag::Float
    }
  }
}
