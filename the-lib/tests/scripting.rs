use std::sync::Arc;

use the_core::{
  Expected,
  TypeTag,
  Value,
  assert_type,
  classify,
};
use the_lib::{
  Regex,
  RegexHost,
  RegexHostConfig,
  Seq,
  SeqError,
  Vector,
};

#[test]
fn split_line_into_numbers() {
  let fields = Regex::new(r"\s*,\s*")
    .unwrap()
    .split_value(&"3, 1,4 , 1,5".into())
    .unwrap();
  assert_eq!(fields.len(), 5);

  let numbers = fields
    .map(|field| {
      field
        .as_str()
        .and_then(|s| s.parse::<i64>().ok())
        .map_or(Value::Nil, Value::from)
    })
    .unwrap();
  let vector = Vector::try_from(numbers).unwrap();
  assert_eq!(vector.sum(), 14.0);
  assert_eq!(vector.deduplicate().to_value(), Value::array(vec![
    3.into(),
    1.into(),
    4.into(),
    5.into(),
  ]));
}

#[test]
fn sequences_round_trip_through_tables() {
  let table = Value::array(vec!["a".into(), "b".into(), "c".into()]);
  assert_eq!(classify(&table), TypeTag::Array);

  let mut seq = Seq::from_value(&table, None).unwrap();
  seq.insert(2, "x".into()).unwrap();
  assert_eq!(seq.pop(Some(1)).unwrap(), Value::from("a"));
  assert_eq!(
    seq.to_value(),
    Value::array(vec!["x".into(), "b".into(), "c".into()])
  );
  assert_eq!(seq.to_string(), r#"{ "x", "b", "c" }"#);
}

#[test]
fn errors_read_well() {
  let err = Seq::new(vec![Value::from(1), Value::from("two")], None).unwrap_err();
  assert_eq!(err.to_string(), r#"element 2: expected integer, got string: "two""#);

  let err = Seq::new(vec![1_i64], None).unwrap().delete(2, 1).unwrap_err();
  assert_eq!(err, SeqError::InvalidRange {
    start: 2,
    end:   1,
    len:   1,
  });
  assert_eq!(err.to_string(), "invalid range 2..=1 for sequence of length 1");

  let err = assert_type(&Value::array(vec![]), Expected::NonNegativeInteger, false).unwrap_err();
  assert_eq!(err.to_string(), "expected non_negative_integer, got table: {}");
}

#[test]
fn configured_host_is_shared() {
  let config = RegexHostConfig::from_toml("case-insensitive = true").unwrap();
  let host = Arc::new(RegexHost::with_config(config));

  let todo = Regex::with_host("todo", host.clone()).unwrap();
  let fixme = Regex::with_host("fixme", host.clone()).unwrap();
  assert_eq!(todo.match_text("// TODO: x", None).unwrap(), Some("TODO"));
  assert_eq!(fixme.gsub("FIXME fixme", "-", true).unwrap(), "- -");
  assert_eq!(host.cached_patterns(), 2);
}
