//! Tests for record transformation

use super::*;
use crate::error::Error;
use crate::schema::{validate, Schema};
use crate::types::InputRecord;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

fn schema(text: &str) -> Schema {
    validate(text).unwrap()
}

fn record(value: Value) -> InputRecord {
    match value {
        Value::Object(obj) => obj,
        _ => panic!("test record must be an object"),
    }
}

fn transform_err(value: Value, schema: &Schema) -> (String, String) {
    match transform(&record(value), schema).unwrap_err() {
        Error::Transform { field, message } => (field, message),
        other => panic!("Expected Transform error, got {other:?}"),
    }
}

const SIMPLE: &str =
    r#"{"fields":[{"name":"ID","type":"int"},{"name":"Name","type":["string","null"]}]}"#;

// ============================================================================
// Basic Conversion
// ============================================================================

#[test]
fn test_transform_with_explicit_null() {
    let schema = schema(SIMPLE);
    let output = transform(&record(json!({"id": 7, "name": null})), &schema).unwrap();

    assert_eq!(output.len(), 2);
    assert_eq!(output.get("id"), Some(&Datum::Int(7)));
    assert_eq!(output.get("name"), Some(&Datum::Null));
}

#[test]
fn test_transform_missing_nullable_field() {
    let schema = schema(SIMPLE);
    let output = transform(&record(json!({"id": 7})), &schema).unwrap();
    assert_eq!(output.get("name"), Some(&Datum::Null));
}

#[test]
fn test_transform_missing_required_field() {
    let schema = schema(SIMPLE);
    let (field, message) = transform_err(json!({"name": "alice"}), &schema);
    assert_eq!(field, "id");
    assert!(message.contains("missing"));
}

#[test]
fn test_transform_null_required_field() {
    let schema = schema(SIMPLE);
    let (field, _) = transform_err(json!({"id": null}), &schema);
    assert_eq!(field, "id");
}

#[test]
fn test_transform_case_insensitive_lookup() {
    let schema = schema(SIMPLE);
    let output = transform(&record(json!({"ID": 1, "Name": "bob"})), &schema).unwrap();
    assert_eq!(output.get("id"), Some(&Datum::Int(1)));
    assert_eq!(output.get("name"), Some(&Datum::String("bob".to_string())));
}

#[test]
fn test_transform_ignores_extra_keys() {
    let schema = schema(SIMPLE);
    let output = transform(&record(json!({"id": 1, "extra": true})), &schema).unwrap();
    assert_eq!(output.len(), 2);
    assert_eq!(output.get("extra"), None);
}

#[test]
fn test_transform_preserves_schema_order() {
    let schema = schema(SIMPLE);
    let output = transform(&record(json!({"name": "x", "id": 2})), &schema).unwrap();
    let names: Vec<&str> = output.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["id", "name"]);
}

// ============================================================================
// Primitives and Coercions
// ============================================================================

const PRIMITIVES: &str = r#"{"fields":[
    {"name":"b","type":"boolean"},
    {"name":"i","type":"int"},
    {"name":"l","type":"long"},
    {"name":"f","type":"float"},
    {"name":"d","type":"double"},
    {"name":"s","type":"string"},
    {"name":"raw","type":"bytes"}
]}"#;

#[test]
fn test_transform_primitives() {
    let schema = schema(PRIMITIVES);
    let output = transform(
        &record(json!({
            "b": true,
            "i": -5,
            "l": 9_000_000_000_i64,
            "f": 1.5,
            "d": 2.25,
            "s": "hello",
            "raw": [0, 1, 255]
        })),
        &schema,
    )
    .unwrap();

    assert_eq!(output.get("b"), Some(&Datum::Boolean(true)));
    assert_eq!(output.get("i"), Some(&Datum::Int(-5)));
    assert_eq!(output.get("l"), Some(&Datum::Long(9_000_000_000)));
    assert_eq!(output.get("f"), Some(&Datum::Float(1.5)));
    assert_eq!(output.get("d"), Some(&Datum::Double(2.25)));
    assert_eq!(output.get("s"), Some(&Datum::String("hello".to_string())));
    assert_eq!(
        output.get("raw"),
        Some(&Datum::Bytes(Bytes::from_static(&[0, 1, 255])))
    );
}

#[test]
fn test_transform_widening() {
    let schema = schema(PRIMITIVES);
    let output = transform(
        &record(json!({
            "b": false, "i": 1, "l": 3, "f": 4, "d": 5, "s": "", "raw": "ab"
        })),
        &schema,
    )
    .unwrap();

    assert_eq!(output.get("l"), Some(&Datum::Long(3)));
    assert_eq!(output.get("f"), Some(&Datum::Float(4.0)));
    assert_eq!(output.get("d"), Some(&Datum::Double(5.0)));
    assert_eq!(output.get("raw"), Some(&Datum::Bytes(Bytes::from_static(b"ab"))));
}

#[test]
fn test_transform_rejects_narrowing() {
    let schema = schema(r#"{"fields":[{"name":"i","type":"int"}]}"#);

    let (field, message) = transform_err(json!({"i": 1.5}), &schema);
    assert_eq!(field, "i");
    assert!(message.contains("expected int"));

    let (_, message) = transform_err(json!({"i": 3_000_000_000_i64}), &schema);
    assert!(message.contains("expected int"));
}

#[test]
fn test_transform_rejects_float_out_of_range() {
    let schema = schema(r#"{"fields":[{"name":"f","type":"float"}]}"#);

    let (field, message) = transform_err(json!({"f": 1e300}), &schema);
    assert_eq!(field, "f");
    assert!(message.contains("expected float"));

    let (_, message) = transform_err(json!({"f": -1e300}), &schema);
    assert!(message.contains("expected float"));

    let (_, message) = transform_err(json!({"f": 1e-300}), &schema);
    assert!(message.contains("expected float"));

    let output = transform(&record(json!({"f": 0.0})), &schema).unwrap();
    assert_eq!(output.get("f"), Some(&Datum::Float(0.0)));

    let output = transform(&record(json!({"f": 3.4e38})), &schema).unwrap();
    assert_eq!(output.get("f"), Some(&Datum::Float(3.4e38)));
}

#[test]
fn test_transform_large_number_falls_through_to_double_branch() {
    let schema = schema(r#"{"fields":[{"name":"v","type":["float","double"]}]}"#);
    let output = transform(&record(json!({"v": 1e300})), &schema).unwrap();
    assert_eq!(output.get("v"), Some(&Datum::Double(1e300)));
}

#[test]
fn test_transform_type_mismatch() {
    let schema = schema(PRIMITIVES);
    let (field, message) = transform_err(
        json!({"b": "yes", "i": 1, "l": 1, "f": 1, "d": 1, "s": "", "raw": []}),
        &schema,
    );
    assert_eq!(field, "b");
    assert_eq!(message, r#"expected boolean, found string "yes""#);
}

#[test]
fn test_transform_bad_bytes() {
    let schema = schema(r#"{"fields":[{"name":"raw","type":"bytes"}]}"#);
    let (field, _) = transform_err(json!({"raw": [1, 256]}), &schema);
    assert_eq!(field, "raw");
}

// ============================================================================
// Named and Complex Types
// ============================================================================

#[test]
fn test_transform_enum_and_fixed() {
    let schema = schema(
        r#"{"fields":[
            {"name":"status","type":{"type":"enum","name":"st","symbols":["on","off"]}},
            {"name":"tag","type":{"type":"fixed","name":"tag4","size":4}}
        ]}"#,
    );

    let output = transform(&record(json!({"status": "on", "tag": "abcd"})), &schema).unwrap();
    assert_eq!(output.get("status"), Some(&Datum::Enum("on".to_string())));
    assert_eq!(output.get("tag"), Some(&Datum::Fixed(Bytes::from_static(b"abcd"))));

    let (field, message) = transform_err(json!({"status": "maybe", "tag": "abcd"}), &schema);
    assert_eq!(field, "status");
    assert!(message.contains("maybe"));

    let (field, message) = transform_err(json!({"status": "off", "tag": "abc"}), &schema);
    assert_eq!(field, "tag");
    assert!(message.contains("expected 4 bytes"));
}

#[test]
fn test_transform_enum_symbols_ignore_case() {
    let schema = schema(
        r#"{"fields":[{"name":"status","type":{"type":"enum","name":"St","symbols":["ON","OFF"]}}]}"#,
    );

    let output = transform(&record(json!({"status": "ON"})), &schema).unwrap();
    assert_eq!(output.get("status"), Some(&Datum::Enum("on".to_string())));

    let output = transform(&record(json!({"Status": "Off"})), &schema).unwrap();
    assert_eq!(output.get("status"), Some(&Datum::Enum("off".to_string())));

    let (field, message) = transform_err(json!({"status": "STANDBY"}), &schema);
    assert_eq!(field, "status");
    assert!(message.contains("'STANDBY' is not a symbol of enum 'st'"));
}

const NESTED: &str = r#"{"fields":[
    {"name":"tags","type":{"type":"array","items":"string"}},
    {"name":"scores","type":{"type":"map","values":["null","double"]}},
    {"name":"address","type":["null",{"type":"record","name":"addr","fields":[
        {"name":"street","type":"string"},
        {"name":"zip","type":["null","int"]}
    ]}]}
]}"#;

#[test]
fn test_transform_nested() {
    let schema = schema(NESTED);
    let output = transform(
        &record(json!({
            "tags": ["a", "b"],
            "scores": {"math": 1.5, "art": null},
            "address": {"street": "main"}
        })),
        &schema,
    )
    .unwrap();

    assert_eq!(
        output.get("tags"),
        Some(&Datum::Array(vec![
            Datum::String("a".to_string()),
            Datum::String("b".to_string())
        ]))
    );

    let Some(Datum::Map(scores)) = output.get("scores") else {
        panic!("Expected map");
    };
    assert_eq!(scores["math"], Datum::Double(1.5));
    assert_eq!(scores["art"], Datum::Null);

    let Some(Datum::Record(address)) = output.get("address") else {
        panic!("Expected record");
    };
    assert_eq!(address.get("street"), Some(&Datum::String("main".to_string())));
    assert_eq!(address.get("zip"), Some(&Datum::Null));
}

#[test]
fn test_transform_nested_error_paths() {
    let schema = schema(NESTED);

    let (field, _) = transform_err(
        json!({"tags": ["a", 2], "scores": {}, "address": null}),
        &schema,
    );
    assert_eq!(field, "tags[1]");

    let (field, _) = transform_err(
        json!({"tags": [null], "scores": {}, "address": null}),
        &schema,
    );
    assert_eq!(field, "tags[0]");

    let (field, _) = transform_err(
        json!({"tags": [], "scores": {"x": "high"}, "address": null}),
        &schema,
    );
    assert_eq!(field, "scores.x");

    let (field, message) = transform_err(
        json!({"tags": [], "scores": {}, "address": {"zip": 1}}),
        &schema,
    );
    assert_eq!(field, "address.street");
    assert!(message.contains("missing"));
}

#[test]
fn test_transform_multi_branch_union() {
    let schema = schema(r#"{"fields":[{"name":"v","type":["null","int","string"]}]}"#);

    let output = transform(&record(json!({"v": 3})), &schema).unwrap();
    assert_eq!(output.get("v"), Some(&Datum::Int(3)));

    let output = transform(&record(json!({"v": "three"})), &schema).unwrap();
    assert_eq!(output.get("v"), Some(&Datum::String("three".to_string())));

    let (field, message) = transform_err(json!({"v": true}), &schema);
    assert_eq!(field, "v");
    assert!(message.contains("one of [null, int, string]"));
}

// ============================================================================
// RecordTransformer
// ============================================================================

#[test]
fn test_record_transformer_is_stateless() {
    let transformer = RecordTransformer::new(Arc::new(schema(SIMPLE)));

    let first = transformer
        .transform_value(&json!({"id": 1, "name": "a"}))
        .unwrap();
    let _ = transformer.transform_value(&json!({"id": "bad"}));
    let again = transformer
        .transform_value(&json!({"id": 1, "name": "a"}))
        .unwrap();

    assert_eq!(first, again);
}

#[test]
fn test_record_transformer_rejects_non_object() {
    let transformer = RecordTransformer::new(Arc::new(schema(SIMPLE)));
    assert!(transformer.transform_value(&json!([1, 2])).is_err());
}

#[test]
fn test_record_transformer_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RecordTransformer>();
}

#[test]
fn test_generic_record_to_json() {
    let schema = schema(SIMPLE);
    let output = transform(&record(json!({"id": 7, "name": null})), &schema).unwrap();
    assert_eq!(output.to_json(), json!({"id": 7, "name": null}));
}
