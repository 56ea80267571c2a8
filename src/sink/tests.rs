//! Tests for the sink module

use super::properties::*;
use super::*;
use crate::compression::{EXPLORE_PARQUET_COMPRESSION, PARQUET_AVRO_SCHEMA, PARQUET_COMPRESSION};
use crate::config::{RawSinkConfig, SinkConfig};
use crate::error::Error;
use crate::template::MacroContext;
use crate::transform::Datum;
use pretty_assertions::assert_eq;
use serde_json::json;

const SCHEMA: &str =
    r#"{"fields":[{"name":"ID","type":"int"},{"name":"Name","type":["string","null"]}]}"#;

fn config(codec: Option<&str>) -> SinkConfig {
    SinkConfig::new("users", None, SCHEMA, codec.map(str::to_string))
}

// ============================================================================
// build_properties
// ============================================================================

#[test]
fn test_build_properties() {
    let props = build_properties(&config(None)).unwrap();

    assert_eq!(props.schema(), Some(SCHEMA.to_lowercase().as_str()));
    assert_eq!(props.explore_schema(), Some("id int, name string"));
    assert!(props.is_explore_enabled());
    assert_eq!(props.get(EXPLORE_FORMAT), Some("parquet"));
    assert_eq!(props.input_format(), Some(PARQUET_INPUT_FORMAT));
    assert_eq!(props.output_format(), Some(PARQUET_OUTPUT_FORMAT));
    assert_eq!(
        props.get(PARQUET_AVRO_SCHEMA),
        Some(SCHEMA.to_lowercase().as_str())
    );
    assert!(!props.contains_key(PARQUET_COMPRESSION));
    assert!(!props.contains_key(BASE_PATH));
}

#[test]
fn test_build_properties_with_codec_and_base_path() {
    let mut config = config(Some("gzip"));
    config.base_path = Some("/data/users".to_string());

    let props = build_properties(&config).unwrap();
    assert_eq!(props.get(PARQUET_COMPRESSION), Some("GZIP"));
    assert_eq!(props.get(EXPLORE_PARQUET_COMPRESSION), Some("GZIP"));
    assert_eq!(props.get(BASE_PATH), Some("/data/users"));
}

#[test]
fn test_build_properties_file_properties_cannot_override() {
    let config = config(None)
        .with_file_properties(r#"{"owner":"etl","explore.enabled":"false","schema":"x"}"#);

    let props = build_properties(&config).unwrap();
    assert_eq!(props.get("owner"), Some("etl"));
    assert!(props.is_explore_enabled());
    assert_eq!(props.schema(), Some(SCHEMA.to_lowercase().as_str()));
}

#[test]
fn test_build_properties_errors() {
    let bad_schema = SinkConfig::new("users", None, "{", None);
    assert!(matches!(
        build_properties(&bad_schema).unwrap_err(),
        Error::SchemaParse { .. }
    ));

    let null_field = SinkConfig::new(
        "users",
        None,
        r#"{"fields":[{"name":"a","type":"null"}]}"#,
        None,
    );
    assert!(matches!(
        build_properties(&null_field).unwrap_err(),
        Error::UnsupportedType { .. }
    ));

    let err = build_properties(&config(Some("bzip3"))).unwrap_err();
    assert!(err.to_string().contains("bzip3"));
}

// ============================================================================
// ParquetSink lifecycle
// ============================================================================

#[test]
fn test_sink_lifecycle() {
    let mut sink = ParquetSink::new(config(None));
    assert_eq!(sink.state(), SinkState::Unconfigured);

    let props = sink.configure().unwrap();
    assert_eq!(sink.state(), SinkState::Configured);
    assert_eq!(props.explore_schema(), Some("id int, name string"));
    assert_eq!(sink.properties(), Some(&props));

    sink.initialize().unwrap();
    assert_eq!(sink.state(), SinkState::Active);

    let record = json!({"id": 7, "name": null});
    let output = sink.transform(record.as_object().unwrap()).unwrap();
    assert_eq!(output.get("id"), Some(&Datum::Int(7)));
    assert_eq!(output.get("name"), Some(&Datum::Null));
}

#[test]
fn test_sink_validation_failure_stays_unconfigured() {
    let mut sink = ParquetSink::new(SinkConfig::new("users", None, "not json", None));
    assert!(sink.configure().is_err());
    assert_eq!(sink.state(), SinkState::Unconfigured);
    assert!(sink.schema().is_none());
    assert!(sink.initialize().is_err());
}

#[test]
fn test_sink_assembly_failure_stays_validated() {
    let mut sink = ParquetSink::new(config(Some("bzip3")));
    assert!(sink.configure().is_err());
    assert_eq!(sink.state(), SinkState::Validated);
    assert!(sink.properties().is_none());
}

#[test]
fn test_sink_transform_requires_active() {
    let mut sink = ParquetSink::new(config(None));
    let record = json!({"id": 1});

    let err = sink.transform(record.as_object().unwrap()).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));

    sink.configure().unwrap();
    assert!(sink.transform(record.as_object().unwrap()).is_err());

    sink.initialize().unwrap();
    assert!(sink.transform(record.as_object().unwrap()).is_ok());
}

#[test]
fn test_sink_initialize_requires_configured() {
    let mut sink = ParquetSink::new(config(None));
    sink.validate().unwrap();
    assert_eq!(sink.state(), SinkState::Validated);

    let err = sink.initialize().unwrap_err();
    assert_eq!(err.to_string(), "Sink is validated, expected configured");
}

#[test]
fn test_sink_never_moves_backward() {
    let mut sink = ParquetSink::new(config(None));
    sink.configure().unwrap();
    sink.initialize().unwrap();

    let again = sink.configure().unwrap();
    assert_eq!(sink.state(), SinkState::Active);
    assert_eq!(again.explore_schema(), Some("id int, name string"));

    sink.validate().unwrap();
    assert_eq!(sink.state(), SinkState::Active);
}

#[test]
fn test_sink_transform_error_names_field() {
    let mut sink = ParquetSink::new(config(None));
    sink.configure().unwrap();
    sink.initialize().unwrap();

    let record = json!({"name": "alice"});
    match sink.transform(record.as_object().unwrap()).unwrap_err() {
        Error::Transform { field, .. } => assert_eq!(field, "id"),
        other => panic!("Expected Transform error, got {other:?}"),
    }
}

#[test]
fn test_sink_from_raw_config() {
    let raw = RawSinkConfig {
        name: Some("users".to_string()),
        schema: Some("${schema}".to_string()),
        compression_codec: Some("snappy".to_string()),
        ..Default::default()
    };
    let ctx = MacroContext::new().with("schema", SCHEMA);

    let mut sink = ParquetSink::from_raw(&raw, &ctx).unwrap();
    let props = sink.configure().unwrap();
    assert_eq!(props.get(PARQUET_COMPRESSION), Some("SNAPPY"));
}

#[test]
fn test_property_bag_serializes_flat() {
    let mut bag = PropertyBag::new();
    bag.insert("b", "2");
    bag.insert("a", "1");
    assert_eq!(
        serde_json::to_value(&bag).unwrap(),
        json!({"a": "1", "b": "2"})
    );
    let keys: Vec<&str> = bag.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b"]);
}
