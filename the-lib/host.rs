//! Host capabilities used by the pattern adapter.
//!
//! The lib only needs three things from its host: a value inspector, a
//! "match this pattern at this offset" primitive and a substitution
//! primitive. They are gathered in the [`Host`] trait so the editor can plug
//! in its own engine, and tests can run without one. [`RegexHost`] is the
//! built-in implementation on top of the `regex` crate.
//!
//! Offsets at this layer are 0-based byte offsets and matches are half-open,
//! like everywhere else in Rust. The 1-based conversion happens in
//! [`crate::pattern`].

use std::borrow::Cow;

use bitflags::bitflags;
use indexmap::IndexMap;
use parking_lot::Mutex;
use regex::{
  NoExpand,
  RegexBuilder,
};
use serde::{
  Deserialize,
  Serialize,
};
use the_core::{
  TypeTag,
  Value,
};
use thiserror::Error;

use crate::seq::SeqError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatternError {
  #[error("invalid pattern {pattern:?}: {message}")]
  Invalid { pattern: String, message: String },
  #[error("host reported match {start}..{end} outside of a subject of length {len}")]
  BadMatch { start: usize, end: usize, len: usize },
  #[error("expected a string subject, got {actual}: {value}")]
  NotAString { value: String, actual: TypeTag },
  #[error(transparent)]
  Seq(#[from] SeqError),
}

pub type Result<T> = std::result::Result<T, PatternError>;

/// A match as reported by the host: byte offsets, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
  pub start: usize,
  pub end:   usize,
}

impl Match {
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct SubstituteFlags: u8 {
    /// Replace every match instead of the first one.
    const GLOBAL = 1 << 0;
    const IGNORE_CASE = 1 << 1;
  }
}

pub trait Host: Send + Sync {
  fn name(&self) -> Cow<'_, str>;

  fn inspect(&self, value: &Value) -> String {
    the_core::inspect(value)
  }

  /// Quote `text` so that it matches itself.
  fn escape(&self, text: &str) -> String;

  fn validate(&self, pattern: &str) -> Result<()>;

  /// The first match of `pattern` in `subject` starting at or after byte
  /// `offset`.
  fn match_at(&self, subject: &str, pattern: &str, offset: usize) -> Result<Option<Match>>;

  /// Replace matches of `pattern` with `replacement`, taken literally.
  fn substitute(
    &self,
    subject: &str,
    pattern: &str,
    replacement: &str,
    flags: SubstituteFlags,
  ) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RegexHostConfig {
  /// Compiled patterns kept around, evicted in compile order; 0 disables
  /// the cache.
  pub cache_capacity:   usize,
  /// Upper bound on the compiled size of a single pattern, in bytes.
  pub size_limit:       usize,
  pub case_insensitive: bool,
}

impl Default for RegexHostConfig {
  fn default() -> Self {
    Self {
      cache_capacity:   64,
      size_limit:       10 * (1 << 20),
      case_insensitive: false,
    }
  }
}

impl RegexHostConfig {
  pub fn from_toml(input: &str) -> std::result::Result<Self, toml::de::Error> {
    toml::from_str(input)
  }
}

/// [`Host`] backed by the `regex` crate.
pub struct RegexHost {
  config: RegexHostConfig,
  cache:  Mutex<IndexMap<(String, bool), regex::Regex>>,
}

impl RegexHost {
  pub fn new() -> Self {
    Self::with_config(RegexHostConfig::default())
  }

  pub fn with_config(config: RegexHostConfig) -> Self {
    Self {
      config,
      cache: Mutex::new(IndexMap::new()),
    }
  }

  pub fn config(&self) -> &RegexHostConfig {
    &self.config
  }

  pub fn cached_patterns(&self) -> usize {
    self.cache.lock().len()
  }

  fn compile(&self, pattern: &str, ignore_case: bool) -> Result<regex::Regex> {
    let ignore_case = ignore_case || self.config.case_insensitive;
    let key = (pattern.to_owned(), ignore_case);

    let mut cache = self.cache.lock();
    if let Some(regex) = cache.get(&key) {
      return Ok(regex.clone());
    }

    let regex = RegexBuilder::new(pattern)
      .case_insensitive(ignore_case)
      .size_limit(self.config.size_limit)
      .build()
      .map_err(|err| {
        PatternError::Invalid {
          pattern: pattern.to_owned(),
          message: err.to_string(),
        }
      })?;
    tracing::trace!(pattern, ignore_case, "compiled pattern");

    let capacity = self.config.cache_capacity;
    if capacity > 0 {
      if cache.len() >= capacity
        && let Some(((evicted, _), _)) = cache.shift_remove_index(0)
      {
        tracing::trace!(pattern = %evicted, "evicted pattern");
      }
      cache.insert(key, regex.clone());
    }
    Ok(regex)
  }
}

impl Default for RegexHost {
  fn default() -> Self {
    Self::new()
  }
}

impl Host for RegexHost {
  fn name(&self) -> Cow<'_, str> {
    "regex".into()
  }

  fn escape(&self, text: &str) -> String {
    regex::escape(text)
  }

  fn validate(&self, pattern: &str) -> Result<()> {
    self.compile(pattern, false).map(|_| ())
  }

  fn match_at(&self, subject: &str, pattern: &str, offset: usize) -> Result<Option<Match>> {
    let regex = self.compile(pattern, false)?;
    if offset > subject.len() {
      return Ok(None);
    }
    let offset = ceil_char_boundary(subject, offset);
    Ok(regex.find_at(subject, offset).map(|m| {
      Match {
        start: m.start(),
        end:   m.end(),
      }
    }))
  }

  fn substitute(
    &self,
    subject: &str,
    pattern: &str,
    replacement: &str,
    flags: SubstituteFlags,
  ) -> Result<String> {
    let regex = self.compile(pattern, flags.contains(SubstituteFlags::IGNORE_CASE))?;
    let replaced = if flags.contains(SubstituteFlags::GLOBAL) {
      regex.replace_all(subject, NoExpand(replacement))
    } else {
      regex.replace(subject, NoExpand(replacement))
    };
    Ok(replaced.into_owned())
  }
}

/// The first char boundary at or after `offset`.
pub(crate) fn ceil_char_boundary(text: &str, offset: usize) -> usize {
  (offset..text.len())
    .find(|&idx| text.is_char_boundary(idx))
    .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn match_at_respects_offset() {
    let host = RegexHost::new();
    assert_eq!(
      host.match_at("abcabc", "b", 0),
      Ok(Some(Match { start: 1, end: 2 }))
    );
    assert_eq!(
      host.match_at("abcabc", "b", 2),
      Ok(Some(Match { start: 4, end: 5 }))
    );
    assert_eq!(host.match_at("abcabc", "b", 5), Ok(None));
    assert_eq!(host.match_at("abc", "", 3), Ok(Some(Match { start: 3, end: 3 })));
    assert_eq!(host.match_at("abc", "", 4), Ok(None));
  }

  #[test]
  fn match_at_rounds_up_inside_a_char() {
    let host = RegexHost::new();
    // 'é' is two bytes
    assert_eq!(
      host.match_at("éa", "a", 1),
      Ok(Some(Match { start: 2, end: 3 }))
    );
  }

  #[test]
  fn invalid_pattern() {
    let host = RegexHost::new();
    assert!(matches!(
      host.validate("("),
      Err(PatternError::Invalid { pattern, .. }) if pattern == "("
    ));
    assert!(host.match_at("x", "(", 0).is_err());
    assert_eq!(host.cached_patterns(), 0);
  }

  #[test]
  fn substitute_is_literal() {
    let host = RegexHost::new();
    let flags = SubstituteFlags::empty();
    assert_eq!(host.substitute("a-b-c", "-", "$0", flags).unwrap(), "a$0b-c");
    assert_eq!(
      host
        .substitute("a-b-c", "-", "+", SubstituteFlags::GLOBAL)
        .unwrap(),
      "a+b+c"
    );
    assert_eq!(
      host
        .substitute("Foo foo", "foo", "x", SubstituteFlags::all())
        .unwrap(),
      "x x"
    );
  }

  #[test]
  fn cache_evicts_first_compiled() {
    let host = RegexHost::with_config(RegexHostConfig {
      cache_capacity: 2,
      ..Default::default()
    });
    for pattern in ["a", "b", "c"] {
      host.validate(pattern).unwrap();
    }
    assert_eq!(host.cached_patterns(), 2);

    let uncached = RegexHost::with_config(RegexHostConfig {
      cache_capacity: 0,
      ..Default::default()
    });
    uncached.validate("a").unwrap();
    assert_eq!(uncached.cached_patterns(), 0);
  }

  #[test]
  fn config_from_toml() {
    let config = RegexHostConfig::from_toml("cache-capacity = 8\ncase-insensitive = true\n").unwrap();
    assert_eq!(config, RegexHostConfig {
      cache_capacity: 8,
      case_insensitive: true,
      ..Default::default()
    });
    assert!(RegexHostConfig::from_toml("unknown = 1").is_err());

    let host = RegexHost::with_config(config);
    assert!(host.match_at("ABC", "b", 0).unwrap().is_some());
  }

  #[test]
  fn inspect_defaults_to_core_inspector() {
    let host = RegexHost::new();
    assert_eq!(host.name(), "regex");
    assert_eq!(host.inspect(&Value::array(vec![1.into()])), "{ 1 }");
    assert_eq!(host.escape("a.b"), r"a\.b");
  }
}
