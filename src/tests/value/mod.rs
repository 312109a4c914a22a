// Copyright (c) The Resolvent Authors.
// Licensed under the MIT License.

use crate::key::AttrKey;
use crate::number::Number;
use crate::value::Value;

use anyhow::Result;

#[test]
fn json_round_trip() -> Result<()> {
    let value = Value::from_json_str(
        r#"{"account/id": 42, "account/tags": ["a", "b"], "account/active": true}"#,
    )?;
    assert_eq!(value["account/id"], Value::from(42i64));
    assert_eq!(value["account/tags"][1], Value::from("b"));
    assert_eq!(value["account/active"], Value::from(true));

    let round = Value::from_json_str(&value.to_json_str()?)?;
    assert_eq!(round, value);
    Ok(())
}

#[test]
fn missing_lookups_are_undefined() -> Result<()> {
    let value = Value::from_json_str(r#"{"a/x": 1}"#)?;
    assert!(value["a/missing"].is_undefined());
    assert!(value[7].is_undefined());
    assert!(Value::Null["a/x"].is_undefined());

    let key: AttrKey = "a/x".parse()?;
    assert_eq!(value[&key], Value::from(1i64));
    Ok(())
}

#[test]
fn merge_keeps_the_first_binding() -> Result<()> {
    let mut base = Value::from_json_str(r#"{"a/x": "original"}"#)?;
    base.merge(Value::from_json_str(r#"{"a/x": "ignored", "a/y": "added"}"#)?)?;
    assert_eq!(base["a/x"], Value::from("original"));
    assert_eq!(base["a/y"], Value::from("added"));
    Ok(())
}

#[test]
fn merge_into_undefined_takes_the_new_value() -> Result<()> {
    let mut value = Value::Undefined;
    value.merge(Value::from("something"))?;
    assert_eq!(value, Value::from("something"));
    Ok(())
}

#[test]
fn merge_of_mismatched_values_fails() {
    let mut value = Value::from(1i64);
    assert!(value.merge(Value::from("other")).is_err());
}

#[test]
fn accessors_expose_the_underlying_kind() -> Result<()> {
    assert!(Value::Null.is_null());
    assert!(!Value::from(false).is_null());
    assert_eq!(Value::from(true).as_bool()?, &true);
    assert!(Value::Null.as_bool().is_err());
    assert_eq!(Value::from("ada").as_string()?.as_ref(), "ada");

    let mut rows = Value::from(vec![Value::from(1i64)]);
    rows.as_array_mut()?.push(Value::from(2i64));
    assert_eq!(rows[1], Value::from(2i64));
    assert!(rows.as_object().is_err());
    Ok(())
}

#[test]
fn numbers_order_across_int_and_float() {
    assert_eq!(Number::from(1i64), Number::from(1.0));
    assert!(Number::from(1i64) < Number::from(1.5));
    assert!(Number::from(2.5) > Number::from(2i64));
    assert_eq!(Number::from(7i64).as_u64(), Some(7));
    assert_eq!(Number::from(-7i64).as_u64(), None);
    assert_eq!(Number::from(2.5).as_i64(), None);
}

#[test]
fn attr_keys_validate_their_shape() -> Result<()> {
    let key: AttrKey = "account/display-name".parse()?;
    assert_eq!(key.namespace(), "account");
    assert_eq!(key.name(), "display-name");
    assert_eq!(key.to_string(), ":account/display-name");
    assert!(!key.is_placeholder());

    // The leading colon of the text form is accepted.
    assert_eq!(":a/b".parse::<AttrKey>()?, "a/b".parse::<AttrKey>()?);

    assert!(AttrKey::new("no-namespace").is_err());
    assert!(AttrKey::new("/name").is_err());
    assert!(AttrKey::new("ns/").is_err());
    assert!(AttrKey::new("a/b/c").is_err());
    assert!(AttrKey::new("a b/c").is_err());
    Ok(())
}

#[test]
fn placeholder_namespace_is_detected() -> Result<()> {
    assert!(AttrKey::new(">/profile")?.is_placeholder());
    assert!(AttrKey::new(">billing/section")?.is_placeholder());
    assert!(!AttrKey::new("account/id")?.is_placeholder());
    Ok(())
}

#[test]
fn undefined_serializes_as_marker_string() -> Result<()> {
    let json = serde_json::to_string(&Value::Undefined)?;
    assert_eq!(json, "\"<undefined>\"");
    Ok(())
}
