//! Bounds-checked, 1-based sequences.
//!
//! A [`Seq`] is a dynamic array whose elements all share one [`TypeTag`].
//! Positions follow the scripting host's convention: the first element is at
//! position 1 and the last at [`Seq::len`].
//!
//! # Element Types
//!
//! Elements implement [`Element`]. Statically typed elements (`bool`, `i64`,
//! `f64`, `String`, nested `Seq`) carry their tag in the type, so the tag
//! check is free. Dynamic [`Value`] elements are classified one by one and
//! rejected when they do not fit the sequence's tag.
//!
//! ```ignore
//! use the_lib::seq::Seq;
//!
//! let mut seq = Seq::new(vec![1_i64, 2, 3], None)?;
//! seq.add(4)?;
//! assert_eq!(seq.get(4)?, &4);
//! seq.delete(1, 2)?;
//! assert_eq!(seq.as_slice(), &[3, 4]);
//! ```
//!
//! # Error Handling
//!
//! Operations return [`Result<T, SeqError>`]:
//!
//! - **AmbiguousType** - No tag given and none can be inferred
//! - **ElementType** - An element does not fit the sequence's tag
//! - **IndexOutOfBounds** / **InvalidRange** - A position outside `1..=len`
//! - **LastPosition** - `set` on the last position, which only
//!   `pop`/`add`/`insert` may touch
//! - **TagMismatch** - Combining sequences with different tags, or giving a
//!   tag that contradicts the element type
//!
//! A failed operation leaves the sequence untouched.

use std::{
  fmt,
  ops::Range,
};

use the_core::{
  TypeError,
  TypeTag,
  Value,
  classify,
  inspect,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SeqError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SeqError {
  #[error("cannot infer the element type of an empty sequence")]
  AmbiguousType,
  #[error("element {index}: expected {expected}, got {actual}: {value}")]
  ElementType {
    index:    usize,
    expected: TypeTag,
    actual:   TypeTag,
    value:    String,
  },
  #[error("elements of type {0} have no default value")]
  NoDefault(TypeTag),
  #[error("position {index} out of bounds for sequence of length {len}")]
  IndexOutOfBounds { index: usize, len: usize },
  #[error("invalid range {start}..={end} for sequence of length {len}")]
  InvalidRange { start: usize, end: usize, len: usize },
  #[error("position {index} is the last position and cannot be set, use pop and add instead")]
  LastPosition { index: usize },
  #[error("sequence of {left} cannot be combined with sequence of {right}")]
  TagMismatch { left: TypeTag, right: TypeTag },
  #[error("expected a numeric element type, got {0}")]
  NotNumeric(TypeTag),
  #[error(transparent)]
  Type(#[from] TypeError),
}

/// A type that can be stored in a [`Seq`].
pub trait Element: Clone + PartialEq + fmt::Debug {
  /// The tag every value of this type has, or `None` when it can only be
  /// known per value.
  fn static_tag() -> Option<TypeTag>;

  fn type_tag(&self) -> TypeTag;

  fn fits(&self, tag: TypeTag) -> bool {
    self.type_tag() == tag
  }

  /// A fresh default for a slot of type `tag`.
  fn zero(tag: TypeTag) -> Option<Self>;

  fn as_number(&self) -> Option<f64> {
    None
  }

  fn inspect(&self) -> String;
}

impl Element for bool {
  fn static_tag() -> Option<TypeTag> {
    Some(TypeTag::Boolean)
  }

  fn type_tag(&self) -> TypeTag {
    TypeTag::Boolean
  }

  fn zero(_tag: TypeTag) -> Option<Self> {
    Some(false)
  }

  fn inspect(&self) -> String {
    self.to_string()
  }
}

impl Element for i64 {
  fn static_tag() -> Option<TypeTag> {
    Some(TypeTag::Integer)
  }

  fn type_tag(&self) -> TypeTag {
    TypeTag::Integer
  }

  fn zero(_tag: TypeTag) -> Option<Self> {
    Some(0)
  }

  fn as_number(&self) -> Option<f64> {
    Some(*self as f64)
  }

  fn inspect(&self) -> String {
    self.to_string()
  }
}

impl Element for f64 {
  fn static_tag() -> Option<TypeTag> {
    Some(TypeTag::Float)
  }

  fn type_tag(&self) -> TypeTag {
    TypeTag::Float
  }

  fn zero(_tag: TypeTag) -> Option<Self> {
    Some(0.0)
  }

  fn as_number(&self) -> Option<f64> {
    Some(*self)
  }

  fn inspect(&self) -> String {
    inspect(&Value::Number(*self))
  }
}

impl Element for String {
  fn static_tag() -> Option<TypeTag> {
    Some(TypeTag::String)
  }

  fn type_tag(&self) -> TypeTag {
    TypeTag::String
  }

  fn zero(_tag: TypeTag) -> Option<Self> {
    Some(String::new())
  }

  fn inspect(&self) -> String {
    format!("{self:?}")
  }
}

impl Element for Value {
  fn static_tag() -> Option<TypeTag> {
    None
  }

  fn type_tag(&self) -> TypeTag {
    classify(self)
  }

  fn fits(&self, tag: TypeTag) -> bool {
    tag.admits(self)
  }

  fn zero(tag: TypeTag) -> Option<Self> {
    tag.zero_value()
  }

  fn as_number(&self) -> Option<f64> {
    Value::as_number(self)
  }

  fn inspect(&self) -> String {
    inspect(self)
  }
}

impl<T: Element> Element for Seq<T> {
  fn static_tag() -> Option<TypeTag> {
    Some(TypeTag::Array)
  }

  fn type_tag(&self) -> TypeTag {
    TypeTag::Array
  }

  fn zero(_tag: TypeTag) -> Option<Self> {
    T::static_tag().and_then(|tag| Seq::with_tag(tag).ok())
  }

  fn inspect(&self) -> String {
    self.to_string()
  }
}

#[derive(Debug, Clone)]
pub struct Seq<T> {
  items: Vec<T>,
  tag:   TypeTag,
}

impl<T: Element> Seq<T> {
  /// Build a sequence from `items`.
  ///
  /// The element tag is `tag` when given, else the element type's own tag,
  /// else the tag of the first item. Every item is checked against it.
  pub fn new(items: Vec<T>, tag: Option<TypeTag>) -> Result<Self> {
    let tag = resolve_tag(tag, items.first())?;
    for (i, item) in items.iter().enumerate() {
      check(tag, i + 1, item)?;
    }
    Ok(Self { items, tag })
  }

  /// An empty sequence of `tag`.
  ///
  /// Element types with a fixed tag only accept that tag.
  pub fn with_tag(tag: TypeTag) -> Result<Self> {
    let tag = resolve_tag::<T>(Some(tag), None)?;
    Ok(Self {
      items: Vec::new(),
      tag,
    })
  }

  /// A sequence of `len` copies of `init`, or of the default for the tag.
  pub fn filled(len: usize, init: Option<T>, tag: Option<TypeTag>) -> Result<Self> {
    let tag = resolve_tag(tag, init.as_ref())?;
    let init = match init {
      Some(init) => init,
      None => T::zero(tag).ok_or(SeqError::NoDefault(tag))?,
    };
    check(tag, 1, &init)?;
    Ok(Self {
      items: vec![init; len],
      tag,
    })
  }

  pub fn tag(&self) -> TypeTag {
    self.tag
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&self, pos: usize) -> Result<&T> {
    let idx = self.index(pos)?;
    Ok(&self.items[idx])
  }

  /// Replace the element at `pos`.
  ///
  /// The last position is rejected; shrink with [`Seq::pop`] and grow with
  /// [`Seq::add`] or [`Seq::insert`] instead.
  pub fn set(&mut self, pos: usize, value: T) -> Result<T> {
    let idx = self.index(pos)?;
    if pos == self.items.len() {
      return Err(SeqError::LastPosition { index: pos });
    }
    check(self.tag, pos, &value)?;
    Ok(std::mem::replace(&mut self.items[idx], value))
  }

  /// Append `value`.
  pub fn add(&mut self, value: T) -> Result<()> {
    check(self.tag, self.items.len() + 1, &value)?;
    self.items.push(value);
    Ok(())
  }

  /// Insert `value` at `pos`, shifting later elements up. `pos` may be one
  /// past the end.
  pub fn insert(&mut self, pos: usize, value: T) -> Result<()> {
    let idx = self.insert_index(pos)?;
    check(self.tag, pos, &value)?;
    self.items.insert(idx, value);
    Ok(())
  }

  /// Append every element of `other`.
  pub fn add_seq(&mut self, other: &Seq<T>) -> Result<()> {
    self.insert_seq(self.items.len() + 1, other)
  }

  /// Splice every element of `other` in at `pos`.
  pub fn insert_seq(&mut self, pos: usize, other: &Seq<T>) -> Result<()> {
    let idx = self.insert_index(pos)?;
    self.same_tag(other)?;
    self.items.splice(idx..idx, other.items.iter().cloned());
    Ok(())
  }

  /// Remove positions `start..=end`.
  pub fn delete(&mut self, start: usize, end: usize) -> Result<()> {
    let range = self.range(start, end)?;
    self.items.drain(range);
    Ok(())
  }

  /// A new sequence holding copies of positions `start..=end`.
  pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
    let range = self.range(start, end)?;
    Ok(Self {
      items: self.items[range].to_vec(),
      tag:   self.tag,
    })
  }

  /// Remove and return the element at `pos`, the last one by default.
  pub fn pop(&mut self, pos: Option<usize>) -> Result<T> {
    let idx = self.index(pos.unwrap_or(self.items.len()))?;
    Ok(self.items.remove(idx))
  }

  /// A new sequence with the elements of `self` followed by those of `other`.
  pub fn concat(&self, other: &Seq<T>) -> Result<Self> {
    self.same_tag(other)?;
    let mut items = Vec::with_capacity(self.items.len() + other.items.len());
    items.extend_from_slice(&self.items);
    items.extend_from_slice(&other.items);
    Ok(Self {
      items,
      tag: self.tag,
    })
  }

  pub fn all(&self, pred: impl FnMut(&T) -> bool) -> bool {
    self.items.iter().all(pred)
  }

  pub fn any(&self, pred: impl FnMut(&T) -> bool) -> bool {
    self.items.iter().any(pred)
  }

  /// Number of elements equal to `value`.
  pub fn count(&self, value: &T) -> usize {
    self.items.iter().filter(|item| *item == value).count()
  }

  pub fn contains(&self, value: &T) -> bool {
    self.items.contains(value)
  }

  /// Position of the first element equal to `value`.
  pub fn index_of(&self, value: &T) -> Option<usize> {
    self.items.iter().position(|item| item == value).map(|idx| idx + 1)
  }

  pub fn first(&self) -> Option<&T> {
    self.items.first()
  }

  pub fn last(&self) -> Option<&T> {
    self.items.last()
  }

  /// A new sequence without repeated elements, keeping first occurrences in
  /// order.
  pub fn deduplicate(&self) -> Self {
    // Elements are only `PartialEq`, so membership is a linear scan.
    let mut items: Vec<T> = Vec::with_capacity(self.items.len());
    for item in &self.items {
      if !items.contains(item) {
        items.push(item.clone());
      }
    }
    Self {
      items,
      tag: self.tag,
    }
  }

  pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Self {
    Self {
      items: self.items.iter().filter(|item| pred(*item)).cloned().collect(),
      tag:   self.tag,
    }
  }

  /// A new sequence of `f` applied to every element.
  ///
  /// The result's tag is inferred like [`Seq::new`] does, so mapping an
  /// empty sequence into dynamic values fails with `AmbiguousType`.
  pub fn map<U: Element>(&self, f: impl FnMut(&T) -> U) -> Result<Seq<U>> {
    Seq::new(self.items.iter().map(f).collect(), None)
  }

  /// Keep only the elements matching `pred`, in place.
  pub fn keep_if(&mut self, mut pred: impl FnMut(&T) -> bool) {
    self.items.retain(|item| pred(item));
  }

  /// Replace every element with `f` applied to it, in place.
  ///
  /// All results are checked before any is stored.
  pub fn apply(&mut self, f: impl FnMut(&T) -> T) -> Result<()> {
    let items: Vec<T> = self.items.iter().map(f).collect();
    for (i, item) in items.iter().enumerate() {
      check(self.tag, i + 1, item)?;
    }
    self.items = items;
    Ok(())
  }

  pub fn reverse(&mut self) {
    self.items.reverse();
  }

  pub fn iter(&self) -> std::slice::Iter<'_, T> {
    self.items.iter()
  }

  pub fn as_slice(&self) -> &[T] {
    &self.items
  }

  /// The elements as a plain vector.
  pub fn unpack(&self) -> Vec<T> {
    self.items.clone()
  }

  pub fn into_vec(self) -> Vec<T> {
    self.items
  }

  fn index(&self, pos: usize) -> Result<usize> {
    let len = self.items.len();
    if pos == 0 || pos > len {
      return Err(SeqError::IndexOutOfBounds { index: pos, len });
    }
    Ok(pos - 1)
  }

  fn insert_index(&self, pos: usize) -> Result<usize> {
    let len = self.items.len();
    if pos == 0 || pos > len + 1 {
      return Err(SeqError::IndexOutOfBounds { index: pos, len });
    }
    Ok(pos - 1)
  }

  fn range(&self, start: usize, end: usize) -> Result<Range<usize>> {
    let len = self.items.len();
    if start == 0 || start > end || end > len {
      return Err(SeqError::InvalidRange { start, end, len });
    }
    Ok(start - 1..end)
  }

  fn same_tag(&self, other: &Seq<T>) -> Result<()> {
    if self.tag != other.tag {
      return Err(SeqError::TagMismatch {
        left:  self.tag,
        right: other.tag,
      });
    }
    Ok(())
  }
}

fn resolve_tag<T: Element>(tag: Option<TypeTag>, first: Option<&T>) -> Result<TypeTag> {
  match (tag, T::static_tag()) {
    (Some(given), Some(fixed)) if given != fixed => {
      Err(SeqError::TagMismatch {
        left:  fixed,
        right: given,
      })
    },
    (Some(tag), _) | (None, Some(tag)) => Ok(tag),
    (None, None) => first.map(Element::type_tag).ok_or(SeqError::AmbiguousType),
  }
}

fn check<T: Element>(tag: TypeTag, index: usize, value: &T) -> Result<()> {
  if value.fits(tag) {
    return Ok(());
  }
  Err(SeqError::ElementType {
    index,
    expected: tag,
    actual: value.type_tag(),
    value: value.inspect(),
  })
}

impl Seq<Value> {
  /// Build a sequence from an array-shaped table.
  ///
  /// An empty table is accepted only when `tag` is given, since there is no
  /// element to infer it from.
  pub fn from_value(value: &Value, tag: Option<TypeTag>) -> Result<Self> {
    let items = match value {
      Value::Table(table) if table.is_empty() && tag.is_some() => Vec::new(),
      Value::Table(table) if table.is_empty() => return Err(SeqError::AmbiguousType),
      Value::Table(table) => {
        table
          .array_values()
          .ok_or_else(|| TypeError::new(value, TypeTag::Array))?
          .into_iter()
          .cloned()
          .collect()
      },
      _ => return Err(TypeError::new(value, TypeTag::Array).into()),
    };
    Self::new(items, tag)
  }

  /// The elements as an array-shaped table.
  pub fn to_value(&self) -> Value {
    Value::array(self.items.iter().cloned())
  }
}

impl<T: PartialEq> PartialEq for Seq<T> {
  fn eq(&self, other: &Self) -> bool {
    self.items == other.items
  }
}

impl<T: Element> fmt::Display for Seq<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.items.is_empty() {
      return f.write_str("{}");
    }
    f.write_str("{ ")?;
    for (i, item) in self.items.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      f.write_str(&item.inspect())?;
    }
    f.write_str(" }")
  }
}

impl<T> IntoIterator for Seq<T> {
  type IntoIter = std::vec::IntoIter<T>;
  type Item = T;

  fn into_iter(self) -> Self::IntoIter {
    self.items.into_iter()
  }
}

impl<'a, T> IntoIterator for &'a Seq<T> {
  type IntoIter = std::slice::Iter<'a, T>;
  type Item = &'a T;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}
