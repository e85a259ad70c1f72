//! Numeric sequences.
//!
//! A [`Vector`] is a [`Seq`] whose element tag is `integer` or `float`. It is
//! built through the `Seq` constructors and then checked, and dereferences to
//! the underlying `Seq` for everything else. Mutations go through the `Seq`
//! tag checks, so a vector stays numeric.

use std::{
  fmt,
  ops::{
    Deref,
    DerefMut,
  },
};

use the_core::{
  TypeTag,
  Value,
};

use crate::seq::{
  Element,
  Result,
  Seq,
  SeqError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T>(Seq<T>);

impl<T: Element> Vector<T> {
  pub fn new(items: Vec<T>, tag: Option<TypeTag>) -> Result<Self> {
    Self::from_seq(Seq::new(items, tag)?)
  }

  pub fn filled(len: usize, init: Option<T>, tag: Option<TypeTag>) -> Result<Self> {
    Self::from_seq(Seq::filled(len, init, tag)?)
  }

  pub fn from_seq(seq: Seq<T>) -> Result<Self> {
    let tag = seq.tag();
    if !tag.is_numeric() {
      tracing::debug!(%tag, "rejected non-numeric vector");
      return Err(SeqError::NotNumeric(tag));
    }
    Ok(Self(seq))
  }

  pub fn into_seq(self) -> Seq<T> {
    self.0
  }

  fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
    self.0.iter().filter_map(Element::as_number)
  }

  pub fn sum(&self) -> f64 {
    self.numbers().sum()
  }

  pub fn min(&self) -> Option<f64> {
    self.numbers().reduce(f64::min)
  }

  pub fn max(&self) -> Option<f64> {
    self.numbers().reduce(f64::max)
  }

  pub fn mean(&self) -> Option<f64> {
    if self.0.is_empty() {
      return None;
    }
    Some(self.sum() / self.0.len() as f64)
  }
}

impl Vector<Value> {
  pub fn from_value(value: &Value, tag: Option<TypeTag>) -> Result<Self> {
    Self::from_seq(Seq::from_value(value, tag)?)
  }
}

impl<T: Element> TryFrom<Seq<T>> for Vector<T> {
  type Error = SeqError;

  fn try_from(seq: Seq<T>) -> Result<Self> {
    Self::from_seq(seq)
  }
}

impl<T> Deref for Vector<T> {
  type Target = Seq<T>;

  fn deref(&self) -> &Seq<T> {
    &self.0
  }
}

impl<T> DerefMut for Vector<T> {
  fn deref_mut(&mut self) -> &mut Seq<T> {
    &mut self.0
  }
}

impl<T: Element> fmt::Display for Vector<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}
