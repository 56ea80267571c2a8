//! Structured record to output record conversion

use crate::error::{Error, Result};
use crate::schema::{FieldType, RecordSchema, Schema};
use crate::transform::value::{Datum, GenericRecord};
use crate::types::{InputRecord, JsonValue};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Longest value excerpt included in error messages
const MAX_EXCERPT_LEN: usize = 64;

/// Converts input records against a fixed schema.
///
/// Holds nothing but the shared schema, so one transformer can serve any
/// number of threads.
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    schema: Arc<Schema>,
}

impl RecordTransformer {
    /// Create a transformer for a validated schema
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    /// The schema records are converted against
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Convert one input record
    pub fn transform(&self, record: &InputRecord) -> Result<GenericRecord> {
        transform(record, &self.schema)
    }

    /// Convert a JSON value, which must be an object
    pub fn transform_value(&self, value: &JsonValue) -> Result<GenericRecord> {
        match value {
            JsonValue::Object(record) => self.transform(record),
            other => Err(Error::transform(
                "<record>",
                format!("expected an object, found {}", kind_of(other)),
            )),
        }
    }
}

/// Convert one input record into an output record following `schema`.
///
/// Missing or null values become [`Datum::Null`] for nullable fields and
/// fail with [`Error::Transform`] for required ones. Input keys that the
/// schema does not name are ignored.
pub fn transform(record: &InputRecord, schema: &Schema) -> Result<GenericRecord> {
    convert_record(record, schema.record(), "")
}

fn convert_record(record: &InputRecord, schema: &RecordSchema, path: &str) -> Result<GenericRecord> {
    let mut output = GenericRecord::with_capacity(schema.fields.len());

    for field in &schema.fields {
        let field_path = if path.is_empty() {
            field.name.clone()
        } else {
            format!("{path}.{}", field.name)
        };

        let value = match lookup(record, &field.name) {
            None | Some(JsonValue::Null) if field.is_nullable() => Datum::Null,
            None => return Err(Error::transform(field_path, "missing required value")),
            Some(JsonValue::Null) => {
                return Err(Error::transform(field_path, "null value for non-nullable field"))
            }
            Some(value) => convert(value, &field.field_type, &field_path)?,
        };
        output.push(field.name.clone(), value);
    }

    Ok(output)
}

/// Exact key first, then an ASCII case-insensitive match.
fn lookup<'a>(record: &'a InputRecord, name: &str) -> Option<&'a JsonValue> {
    record.get(name).or_else(|| {
        record
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn convert(value: &JsonValue, field_type: &FieldType, path: &str) -> Result<Datum> {
    match (field_type, value) {
        (FieldType::Null, JsonValue::Null) => Ok(Datum::Null),

        (FieldType::Boolean, JsonValue::Bool(b)) => Ok(Datum::Boolean(*b)),

        (FieldType::Int, JsonValue::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Datum::Int)
            .ok_or_else(|| mismatch(field_type, value, path)),

        (FieldType::Long, JsonValue::Number(n)) => n
            .as_i64()
            .map(Datum::Long)
            .ok_or_else(|| mismatch(field_type, value, path)),

        // int and long widen to float and double
        (FieldType::Float, JsonValue::Number(n)) => n
            .as_f64()
            .and_then(to_f32)
            .map(Datum::Float)
            .ok_or_else(|| mismatch(field_type, value, path)),

        (FieldType::Double, JsonValue::Number(n)) => n
            .as_f64()
            .map(Datum::Double)
            .ok_or_else(|| mismatch(field_type, value, path)),

        (FieldType::String, JsonValue::String(s)) => Ok(Datum::String(s.clone())),

        (FieldType::Bytes, _) => to_bytes(value, field_type, path).map(Datum::Bytes),

        (FieldType::Fixed(fixed), _) => {
            let bytes = to_bytes(value, field_type, path)?;
            if bytes.len() != fixed.size {
                return Err(Error::transform(
                    path,
                    format!(
                        "expected {} bytes for fixed '{}', found {}",
                        fixed.size,
                        fixed.name,
                        bytes.len()
                    ),
                ));
            }
            Ok(Datum::Fixed(bytes))
        }

        // Symbols are stored lower-cased, as the rest of the schema
        (FieldType::Enum(e), JsonValue::String(s)) => match e.symbol(s) {
            Some(symbol) => Ok(Datum::Enum(symbol.to_string())),
            None => Err(Error::transform(
                path,
                format!("'{s}' is not a symbol of enum '{}'", e.name),
            )),
        },

        (FieldType::Array(items), JsonValue::Array(values)) => values
            .iter()
            .enumerate()
            .map(|(i, item)| convert_nested(item, items, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Datum::Array),

        (FieldType::Map(value_type), JsonValue::Object(entries)) => entries
            .iter()
            .map(|(key, item)| {
                convert_nested(item, value_type, &format!("{path}.{key}"))
                    .map(|datum| (key.clone(), datum))
            })
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Datum::Map),

        (FieldType::Record(record), JsonValue::Object(obj)) => {
            convert_record(obj, record, path).map(Datum::Record)
        }

        (FieldType::Union(branches), _) => convert_union(value, branches, field_type, path),

        _ => Err(mismatch(field_type, value, path)),
    }
}

/// Narrow to `f32` only when the value stays in range.
fn to_f32(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    let overflowed = value.is_finite() && narrowed.is_infinite();
    let underflowed = value != 0.0 && narrowed == 0.0;
    (!overflowed && !underflowed).then_some(narrowed)
}

/// Array elements and map values may be null only when their type allows it.
fn convert_nested(value: &JsonValue, field_type: &FieldType, path: &str) -> Result<Datum> {
    if value.is_null() && !field_type.is_nullable() {
        return Err(Error::transform(path, "null value for non-nullable element"));
    }
    convert(value, field_type, path)
}

fn convert_union(
    value: &JsonValue,
    branches: &[FieldType],
    union_type: &FieldType,
    path: &str,
) -> Result<Datum> {
    if value.is_null() {
        return if union_type.is_nullable() {
            Ok(Datum::Null)
        } else {
            Err(mismatch(union_type, value, path))
        };
    }

    // A nullable single type reports the inner mismatch directly
    if let Some(inner) = union_type.non_null() {
        return convert(value, inner, path);
    }

    branches
        .iter()
        .filter(|branch| **branch != FieldType::Null)
        .find_map(|branch| convert(value, branch, path).ok())
        .ok_or_else(|| mismatch(union_type, value, path))
}

/// Strings are taken as UTF-8; arrays must hold integers in 0..=255.
fn to_bytes(value: &JsonValue, field_type: &FieldType, path: &str) -> Result<Bytes> {
    match value {
        JsonValue::String(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Bytes::from)
            .ok_or_else(|| mismatch(field_type, value, path)),
        _ => Err(mismatch(field_type, value, path)),
    }
}

fn mismatch(expected: &FieldType, found: &JsonValue, path: &str) -> Error {
    Error::transform(
        path,
        format!(
            "expected {}, found {} {}",
            describe(expected),
            kind_of(found),
            excerpt(found)
        ),
    )
}

fn describe(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Union(branches) => {
            let names: Vec<&str> = branches.iter().map(FieldType::type_name).collect();
            format!("one of [{}]", names.join(", "))
        }
        other => other.type_name().to_string(),
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_f64() => "number",
        JsonValue::Number(_) => "integer",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn excerpt(value: &JsonValue) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_EXCERPT_LEN {
        return text;
    }
    let truncated: String = text.chars().take(MAX_EXCERPT_LEN).collect();
    format!("{truncated}...")
}
