//! Dynamic values as the scripting host hands them over.
//!
//! Numbers have a single representation; whether a number counts as an
//! integer is decided by [`classify`](crate::classify), not by the variant.
//! Tables keep their insertion order so diagnostics print them the way they
//! were built, but compare structurally.

use indexmap::IndexMap;

/// Opaque reference to a host object (function, userdata or thread).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
  pub const fn new(id: u64) -> Self {
    Self(id)
  }

  pub const fn get(self) -> u64 {
    self.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
  Integer(i64),
  String(String),
}

impl From<i64> for Key {
  fn from(key: i64) -> Self {
    Self::Integer(key)
  }
}

impl From<i32> for Key {
  fn from(key: i32) -> Self {
    Self::Integer(key.into())
  }
}

impl From<usize> for Key {
  fn from(key: usize) -> Self {
    Self::Integer(key as i64)
  }
}

impl From<&str> for Key {
  fn from(key: &str) -> Self {
    Self::String(key.to_owned())
  }
}

impl From<String> for Key {
  fn from(key: String) -> Self {
    Self::String(key)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
  entries: IndexMap<Key, Value>,
}

impl Table {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
    self.entries.get(&key.into())
  }

  /// Store `value` under `key`. Storing `nil` removes the key, like the host
  /// does.
  pub fn insert(&mut self, key: impl Into<Key>, value: Value) -> Option<Value> {
    let key = key.into();
    if value.is_nil() {
      return self.entries.shift_remove(&key);
    }
    self.entries.insert(key, value)
  }

  pub fn remove(&mut self, key: impl Into<Key>) -> Option<Value> {
    self.entries.shift_remove(&key.into())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
    self.entries.iter()
  }

  /// A table is an array when it is non-empty and its keys are exactly the
  /// integers `1..=len`.
  pub fn is_array(&self) -> bool {
    let len = self.entries.len() as i64;
    len > 0
      && self
        .entries
        .keys()
        .all(|key| matches!(key, Key::Integer(i) if (1..=len).contains(i)))
  }

  /// Values at `1..=len` in order, or `None` when the table is not an array.
  pub fn array_values(&self) -> Option<Vec<&Value>> {
    if !self.is_array() {
      return None;
    }
    (1..=self.entries.len() as i64)
      .map(|i| self.entries.get(&Key::Integer(i)))
      .collect()
  }
}

impl FromIterator<Value> for Table {
  fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
    let mut table = Table::new();
    for (i, value) in iter.into_iter().enumerate() {
      table.insert(i + 1, value);
    }
    table
  }
}

impl<K: Into<Key>> FromIterator<(K, Value)> for Table {
  fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
    let mut table = Table::new();
    for (key, value) in iter {
      table.insert(key, value);
    }
    table
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
  #[default]
  Nil,
  Boolean(bool),
  Number(f64),
  String(String),
  Function(Handle),
  Userdata(Handle),
  Thread(Handle),
  Table(Table),
}

impl Value {
  /// Build an array-shaped table from `values`.
  pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
    Self::Table(values.into_iter().collect())
  }

  pub fn is_nil(&self) -> bool {
    matches!(self, Self::Nil)
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Boolean(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      _ => None,
    }
  }

  /// The number as an `i64` when it has no fractional part and fits.
  pub fn as_integer(&self) -> Option<i64> {
    let n = self.as_number()?;
    if is_integral(n) && n >= i64::MIN as f64 && n < i64::MAX as f64 {
      Some(n as i64)
    } else {
      None
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_table(&self) -> Option<&Table> {
    match self {
      Self::Table(table) => Some(table),
      _ => None,
    }
  }
}

#[inline]
pub(crate) fn is_integral(n: f64) -> bool {
  n.is_finite() && n.fract() == 0.0
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Self::Boolean(b)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Self::Number(n as f64)
  }
}

impl From<i32> for Value {
  fn from(n: i32) -> Self {
    Self::Number(n.into())
  }
}

impl From<usize> for Value {
  fn from(n: usize) -> Self {
    Self::Number(n as f64)
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Self::Number(n)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Self::String(s.to_owned())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl From<Table> for Value {
  fn from(table: Table) -> Self {
    Self::Table(table)
  }
}

impl From<Vec<Value>> for Value {
  fn from(values: Vec<Value>) -> Self {
    Self::array(values)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(value: Option<T>) -> Self {
    value.map_or(Self::Nil, Into::into)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn storing_nil_removes_key() {
    let mut table = Table::new();
    table.insert("a", 1.into());
    table.insert("b", 2.into());
    assert_eq!(table.len(), 2);

    assert_eq!(table.insert("a", Value::Nil), Some(Value::from(1)));
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("a"), None);
  }

  #[test]
  fn array_shape() {
    let array: Table = vec![Value::from(1), Value::from(2), Value::from(3)]
      .into_iter()
      .collect();
    assert!(array.is_array());
    assert_eq!(array.array_values().map(|v| v.len()), Some(3));

    assert!(!Table::new().is_array());

    let mut gap = Table::new();
    gap.insert(1, "a".into());
    gap.insert(3, "c".into());
    assert!(!gap.is_array());
    assert_eq!(gap.array_values(), None);

    let mut zero_based = Table::new();
    zero_based.insert(0, "a".into());
    assert!(!zero_based.is_array());

    let mut mixed = array.clone();
    mixed.insert("key", true.into());
    assert!(!mixed.is_array());
  }

  #[test]
  fn array_order_follows_keys_not_insertion() {
    let mut table = Table::new();
    table.insert(2, "b".into());
    table.insert(1, "a".into());
    let values = table.array_values().unwrap();
    assert_eq!(values, vec![&Value::from("a"), &Value::from("b")]);
  }

  #[test]
  fn tables_compare_structurally() {
    let mut a = Table::new();
    a.insert("x", 1.into());
    a.insert("y", Value::array(vec![1.into(), 2.into()]));
    let mut b = Table::new();
    b.insert("y", Value::array(vec![1.into(), 2.into()]));
    b.insert("x", 1.into());
    assert_eq!(Value::from(a.clone()), Value::from(b));

    let mut c = a.clone();
    c.insert("y", Value::array(vec![1.into(), 3.into()]));
    assert_ne!(Value::from(c), Value::from(a));
  }

  #[test]
  fn integer_view() {
    assert_eq!(Value::from(3.0).as_integer(), Some(3));
    assert_eq!(Value::from(-7).as_integer(), Some(-7));
    assert_eq!(Value::from(3.5).as_integer(), None);
    assert_eq!(Value::from(f64::INFINITY).as_integer(), None);
    assert_eq!(Value::from(f64::NAN).as_integer(), None);
    assert_eq!(Value::from("3").as_integer(), None);
  }
}
