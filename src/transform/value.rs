//! Output record representation

use bytes::Bytes;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A typed value inside an output record
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
    String(String),
    Enum(String),
    Fixed(Bytes),
    Array(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
    Record(GenericRecord),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// JSON rendering. Byte values become arrays of integers.
    pub fn to_json(&self) -> Value {
        match self {
            Datum::Null => Value::Null,
            Datum::Boolean(b) => json!(b),
            Datum::Int(i) => json!(i),
            Datum::Long(l) => json!(l),
            Datum::Float(f) => {
                serde_json::Number::from_f64(f64::from(*f)).map_or(Value::Null, Value::Number)
            }
            Datum::Double(d) => serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number),
            Datum::Bytes(b) | Datum::Fixed(b) => json!(&b[..]),
            Datum::String(s) | Datum::Enum(s) => json!(s),
            Datum::Array(items) => Value::Array(items.iter().map(Datum::to_json).collect()),
            Datum::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Datum::Record(record) => record.to_json(),
        }
    }
}

/// A record in schema field order, ready for the Parquet write path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericRecord {
    fields: Vec<(String, Datum)>,
}

impl GenericRecord {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Datum) {
        self.fields.push((name.into(), value));
    }

    /// Value of a field by name
    pub fn get(&self, name: &str) -> Option<&Datum> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Value at a field position
    pub fn get_index(&self, index: usize) -> Option<&Datum> {
        self.fields.get(index).map(|(_, v)| v)
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object rendering, in field order
    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            obj.insert(name.clone(), value.to_json());
        }
        Value::Object(obj)
    }
}
