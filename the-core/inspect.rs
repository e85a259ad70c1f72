//! Readable rendering of values for diagnostics.
//!
//! Output follows the host's own inspector closely enough that messages read
//! the same whether they come from a script or from here:
//! `{ 1, 2, 3 }`, `{ name = "x", ["two words"] = true }`, `<function 7>`.

use std::fmt::{
  self,
  Write,
};

use crate::value::{
  Key,
  Table,
  Value,
  is_integral,
};

pub fn inspect(value: &Value) -> String {
  value.to_string()
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_value(f, self)
  }
}

fn write_value(out: &mut impl Write, value: &Value) -> fmt::Result {
  match value {
    Value::Nil => out.write_str("nil"),
    Value::Boolean(b) => write!(out, "{b}"),
    Value::Number(n) => write_number(out, *n),
    Value::String(s) => write!(out, "{s:?}"),
    Value::Function(handle) => write!(out, "<function {}>", handle.get()),
    Value::Userdata(handle) => write!(out, "<userdata {}>", handle.get()),
    Value::Thread(handle) => write!(out, "<thread {}>", handle.get()),
    Value::Table(table) => write_table(out, table),
  }
}

fn write_number(out: &mut impl Write, n: f64) -> fmt::Result {
  if n.is_nan() {
    out.write_str("nan")
  } else if n.is_infinite() {
    out.write_str(if n > 0.0 { "inf" } else { "-inf" })
  } else if is_integral(n) && n.abs() < 1e15 {
    write!(out, "{}", n as i64)
  } else {
    write!(out, "{n}")
  }
}

fn write_table(out: &mut impl Write, table: &Table) -> fmt::Result {
  if table.is_empty() {
    return out.write_str("{}");
  }

  out.write_str("{ ")?;
  if let Some(values) = table.array_values() {
    for (i, value) in values.into_iter().enumerate() {
      if i > 0 {
        out.write_str(", ")?;
      }
      write_value(out, value)?;
    }
  } else {
    for (i, (key, value)) in table.iter().enumerate() {
      if i > 0 {
        out.write_str(", ")?;
      }
      write_key(out, key)?;
      out.write_str(" = ")?;
      write_value(out, value)?;
    }
  }
  out.write_str(" }")
}

fn write_key(out: &mut impl Write, key: &Key) -> fmt::Result {
  match key {
    Key::Integer(i) => write!(out, "[{i}]"),
    Key::String(s) if is_identifier(s) => out.write_str(s),
    Key::String(s) => write!(out, "[{s:?}]"),
  }
}

fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
