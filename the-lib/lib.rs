//! Scripting helpers: typed sequences and a pattern adapter over the host.

pub mod host;
pub mod pattern;
pub mod seq;
pub mod vector;

pub use host::{
  Host,
  PatternError,
  RegexHost,
  RegexHostConfig,
};
pub use pattern::Regex;
pub use seq::{
  Element,
  Seq,
  SeqError,
};
pub use vector::Vector;
