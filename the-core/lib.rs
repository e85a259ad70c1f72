//! Dynamic values of the scripting host and the type checks built on them.

pub mod check;
pub mod inspect;
pub mod tag;
pub mod value;

pub use check::{
  Expected,
  TypeError,
  assert_type,
};
pub use inspect::inspect;
pub use tag::{
  TypeTag,
  classify,
};
pub use value::{
  Handle,
  Key,
  Table,
  Value,
};
