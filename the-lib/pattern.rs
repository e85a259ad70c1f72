//! Pattern matching with the scripting host's conventions.
//!
//! [`Regex`] pairs a pattern string with the [`Host`] that runs it. The host
//! does all of the matching; this module translates between the host's
//! 0-based half-open byte offsets and the 1-based inclusive positions
//! scripts use, and builds iteration and tokenization on top of the single
//! "match at offset" primitive.
//!
//! # Positions
//!
//! `find("hello world", "wor")` reports `start = 7`, `end = 9`: the first
//! matched byte is the 7th, the last one the 9th. An empty match reports
//! `end = start - 1`.
//!
//! # Iteration
//!
//! [`Regex::gmatch`] and [`Regex::gsplit`] return iterators that carry the
//! scan position; the handle itself is never mutated. Both always move
//! forward, so a pattern that matches the empty string cannot stall them.
//!
//! ```ignore
//! use the_lib::pattern::Regex;
//!
//! let words = Regex::new(r"\w+")?;
//! let found: Vec<_> = words
//!   .gmatch("one two")
//!   .map(|m| m.map(|m| m.text))
//!   .collect::<Result<_, _>>()?;
//! assert_eq!(found, ["one", "two"]);
//!
//! assert_eq!(Regex::new(",")?.split("a,b,,c")?, ["a", "b", "", "c"]);
//! ```

use std::{
  fmt,
  iter::FusedIterator,
  sync::Arc,
};

use once_cell::sync::Lazy;
use the_core::{
  TypeTag,
  Value,
  classify,
};

use crate::{
  host::{
    Host,
    Match,
    PatternError,
    RegexHost,
    Result,
    SubstituteFlags,
  },
  seq::Seq,
};

static DEFAULT_HOST: Lazy<Arc<dyn Host>> = Lazy::new(|| Arc::new(RegexHost::new()) as Arc<dyn Host>);

/// The host used by [`Regex::new`] and the free functions of this module.
pub fn default_host() -> Arc<dyn Host> {
  DEFAULT_HOST.clone()
}

/// A match in script positions: 1-based, `end` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found<'s> {
  pub start: usize,
  pub end:   usize,
  pub text:  &'s str,
}

#[derive(Clone)]
pub struct Regex {
  pattern: String,
  host:    Arc<dyn Host>,
}

impl Regex {
  pub fn new(pattern: impl Into<String>) -> Result<Self> {
    Self::with_host(pattern, default_host())
  }

  pub fn with_host(pattern: impl Into<String>, host: Arc<dyn Host>) -> Result<Self> {
    let pattern = pattern.into();
    host.validate(&pattern)?;
    Ok(Self { pattern, host })
  }

  /// A pattern matching `text` literally.
  pub fn plain(text: &str) -> Result<Self> {
    Self::plain_with_host(text, default_host())
  }

  pub fn plain_with_host(text: &str, host: Arc<dyn Host>) -> Result<Self> {
    let pattern = host.escape(text);
    Self::with_host(pattern, host)
  }

  pub fn as_str(&self) -> &str {
    &self.pattern
  }

  pub fn host(&self) -> &Arc<dyn Host> {
    &self.host
  }

  /// The first match at or after position `init`.
  ///
  /// A missing or non-positive `init` starts at position 1. Starting past
  /// the end of `subject` finds nothing.
  pub fn find<'s>(&self, subject: &'s str, init: Option<i64>) -> Result<Option<Found<'s>>> {
    let init = init.filter(|&init| init > 0).unwrap_or(1);
    let offset = usize::try_from(init - 1).unwrap_or(usize::MAX);
    if offset > subject.len() {
      return Ok(None);
    }
    Ok(self.match_from(subject, offset)?.map(|m| found(subject, m)))
  }

  /// Only the matched text of [`Regex::find`].
  pub fn match_text<'s>(&self, subject: &'s str, init: Option<i64>) -> Result<Option<&'s str>> {
    Ok(self.find(subject, init)?.map(|found| found.text))
  }

  /// Every match in `subject`, left to right.
  pub fn gmatch<'r, 's>(&'r self, subject: &'s str) -> Matches<'r, 's> {
    Matches {
      regex: self,
      subject,
      pos: 0,
      last_end: None,
      done: false,
    }
  }

  /// Replace the first match, or every match when `global` is set, with the
  /// literal `replacement`.
  pub fn gsub(&self, subject: &str, replacement: &str, global: bool) -> Result<String> {
    let flags = if global {
      SubstituteFlags::GLOBAL
    } else {
      SubstituteFlags::empty()
    };
    self
      .host
      .substitute(subject, &self.pattern, replacement, flags)
  }

  /// The pieces of `subject` between matches.
  pub fn gsplit<'r, 's>(&'r self, subject: &'s str) -> Splits<'r, 's> {
    Splits {
      regex: self,
      subject,
      pos: 0,
      done: false,
    }
  }

  pub fn split<'s>(&self, subject: &'s str) -> Result<Vec<&'s str>> {
    self.gsplit(subject).collect()
  }

  /// Like [`Regex::split`], without empty pieces at either end.
  pub fn split_trimmed<'s>(&self, subject: &'s str) -> Result<Vec<&'s str>> {
    let pieces = self.split(subject)?;
    let start = pieces.iter().position(|piece| !piece.is_empty());
    let end = pieces.iter().rposition(|piece| !piece.is_empty());
    Ok(match (start, end) {
      (Some(start), Some(end)) => pieces[start..=end].to_vec(),
      _ => Vec::new(),
    })
  }

  /// Split a host string value into a sequence of strings.
  pub fn split_value(&self, subject: &Value) -> Result<Seq<Value>> {
    let Some(text) = subject.as_str() else {
      return Err(PatternError::NotAString {
        value:  self.host.inspect(subject),
        actual: classify(subject),
      });
    };
    let pieces = self.split(text)?.into_iter().map(Value::from).collect();
    Ok(Seq::new(pieces, Some(TypeTag::String))?)
  }

  fn match_from(&self, subject: &str, offset: usize) -> Result<Option<Match>> {
    let Some(m) = self.host.match_at(subject, &self.pattern, offset)? else {
      return Ok(None);
    };
    let valid = offset <= m.start
      && m.start <= m.end
      && subject.is_char_boundary(m.start)
      && subject.is_char_boundary(m.end);
    if !valid {
      return Err(PatternError::BadMatch {
        start: m.start,
        end:   m.end,
        len:   subject.len(),
      });
    }
    Ok(Some(m))
  }
}

impl fmt::Debug for Regex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Regex")
      .field("pattern", &self.pattern)
      .field("host", &self.host.name())
      .finish()
  }
}

fn found(subject: &str, m: Match) -> Found<'_> {
  Found {
    start: m.start + 1,
    end:   m.end,
    text:  &subject[m.start..m.end],
  }
}

/// Offset just past the char at `pos`, or past the end of `text`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
  text
    .get(pos..)
    .and_then(|rest| rest.chars().next())
    .map_or(pos + 1, |ch| pos + ch.len_utf8())
}

/// Iterator returned by [`Regex::gmatch`].
#[derive(Debug, Clone)]
pub struct Matches<'r, 's> {
  regex:    &'r Regex,
  subject:  &'s str,
  pos:      usize,
  last_end: Option<usize>,
  done:     bool,
}

impl Matches<'_, '_> {
  /// Start over from the beginning of the subject.
  pub fn reset(&mut self) {
    self.pos = 0;
    self.last_end = None;
    self.done = false;
  }
}

impl<'s> Iterator for Matches<'_, 's> {
  type Item = Result<Found<'s>>;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.done && self.pos <= self.subject.len() {
      let m = match self.regex.match_from(self.subject, self.pos) {
        Ok(Some(m)) => m,
        Ok(None) => break,
        Err(err) => {
          tracing::warn!(pattern = self.regex.as_str(), "stopped matching: {err}");
          self.done = true;
          return Some(Err(err));
        },
      };

      // An empty match where the previous match ended is not a new match.
      if m.is_empty() && self.last_end == Some(m.end) {
        self.pos = next_char_boundary(self.subject, m.start);
        continue;
      }

      self.pos = if m.is_empty() {
        next_char_boundary(self.subject, m.end)
      } else {
        m.end
      };
      self.last_end = Some(m.end);
      return Some(Ok(found(self.subject, m)));
    }

    self.done = true;
    None
  }
}

impl FusedIterator for Matches<'_, '_> {}

/// Iterator returned by [`Regex::gsplit`].
#[derive(Debug, Clone)]
pub struct Splits<'r, 's> {
  regex:   &'r Regex,
  subject: &'s str,
  pos:     usize,
  done:    bool,
}

impl<'s> Iterator for Splits<'_, 's> {
  type Item = Result<&'s str>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }

    let subject = self.subject;
    let start = self.pos;
    let mut from = start;
    loop {
      let m = match self.regex.match_from(subject, from) {
        Ok(Some(m)) => m,
        Ok(None) => {
          self.done = true;
          return Some(Ok(&subject[start..]));
        },
        Err(err) => {
          tracing::warn!(pattern = self.regex.as_str(), "stopped splitting: {err}");
          self.done = true;
          return Some(Err(err));
        },
      };

      if !m.is_empty() || m.start > start {
        self.pos = m.end;
        return Some(Ok(&subject[start..m.start]));
      }

      // Empty match right where the piece starts. At the end of the subject
      // there is nothing left to split off.
      if start >= subject.len() {
        self.done = true;
        return None;
      }
      let next = next_char_boundary(subject, start);
      // The empty pattern splits between characters; anything else looks
      // for the next separator one char further.
      if self.regex.as_str().is_empty() {
        self.pos = next;
        return Some(Ok(&subject[start..next]));
      }
      from = next;
    }
  }
}

impl FusedIterator for Splits<'_, '_> {}

pub fn find<'s>(subject: &'s str, pattern: &str, init: Option<i64>) -> Result<Option<Found<'s>>> {
  Regex::new(pattern)?.find(subject, init)
}

pub fn match_text<'s>(subject: &'s str, pattern: &str, init: Option<i64>) -> Result<Option<&'s str>> {
  Regex::new(pattern)?.match_text(subject, init)
}

pub fn gsub(subject: &str, pattern: &str, replacement: &str, global: bool) -> Result<String> {
  Regex::new(pattern)?.gsub(subject, replacement, global)
}

pub fn split<'s>(subject: &'s str, pattern: &str) -> Result<Vec<&'s str>> {
  Regex::new(pattern)?.split(subject)
}
