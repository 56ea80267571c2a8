//! Schema types

use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fmt;

/// A validated record schema.
///
/// The top level of a sink schema is always a record. Once built it is never
/// mutated; share it behind an `Arc` between transformers.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root: RecordSchema,
}

impl Schema {
    pub(crate) fn new(root: RecordSchema) -> Self {
        Self { root }
    }

    /// Top-level record name, if one was declared
    pub fn name(&self) -> Option<&str> {
        self.root.name.as_deref()
    }

    /// The top-level record
    pub fn record(&self) -> &RecordSchema {
        &self.root
    }

    /// Top-level fields, in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.root.fields
    }

    /// Look up a top-level field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.root.field(name)
    }

    /// Serialize back to the JSON schema form.
    ///
    /// Named types are written in full on first use and by name afterwards,
    /// so the output parses back to an identical schema.
    pub fn to_json(&self) -> Value {
        let mut seen = HashSet::new();
        record_to_json(&self.root, None, &mut seen)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A record: named, ordered fields
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Record name (optional only at the top level)
    pub name: Option<String>,
    /// Namespace, kept for re-serialization
    pub namespace: Option<String>,
    /// Documentation string
    pub doc: Option<String>,
    /// Fields in declaration order
    pub fields: Vec<Field>,
}

impl RecordSchema {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Namespace-qualified name, if the record is named
    pub fn full_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(|name| qualify(self.namespace.as_deref(), name))
    }
}

/// A single record field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name (lower-cased)
    pub name: String,
    /// Field type
    pub field_type: FieldType,
    /// Documentation string
    pub doc: Option<String>,
}

impl Field {
    /// Create a field without documentation
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            doc: None,
        }
    }

    /// Whether a missing value is allowed for this field
    pub fn is_nullable(&self) -> bool {
        self.field_type.is_nullable()
    }
}

/// Enumeration of string symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub name: String,
    pub namespace: Option<String>,
    pub symbols: Vec<String>,
}

impl EnumSchema {
    pub fn full_name(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }

    /// The declared symbol matching `value`, ignoring ASCII case
    pub fn symbol(&self, value: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|symbol| symbol.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }
}

/// Fixed-size byte sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSchema {
    pub name: String,
    pub namespace: Option<String>,
    pub size: usize,
}

impl FixedSchema {
    pub fn full_name(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }
}

/// Join a namespace and a short name into a full name
pub(crate) fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}.{name}"),
        None => name.to_string(),
    }
}

/// Field type
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Fixed(FixedSchema),
    Array(Box<FieldType>),
    Map(Box<FieldType>),
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Primitive type for a type tag, if it names one
    pub fn primitive(tag: &str) -> Option<FieldType> {
        match tag {
            "null" => Some(FieldType::Null),
            "boolean" | "bool" => Some(FieldType::Boolean),
            "int" => Some(FieldType::Int),
            "long" => Some(FieldType::Long),
            "float" => Some(FieldType::Float),
            "double" => Some(FieldType::Double),
            "bytes" => Some(FieldType::Bytes),
            "string" => Some(FieldType::String),
            _ => None,
        }
    }

    /// Type tag used in the JSON schema form
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Boolean => "boolean",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Bytes => "bytes",
            FieldType::String => "string",
            FieldType::Record(_) => "record",
            FieldType::Enum(_) => "enum",
            FieldType::Fixed(_) => "fixed",
            FieldType::Array(_) => "array",
            FieldType::Map(_) => "map",
            FieldType::Union(_) => "union",
        }
    }

    /// Namespace-qualified name of a named type (record, enum, fixed)
    pub fn full_name(&self) -> Option<String> {
        match self {
            FieldType::Record(r) => r.full_name(),
            FieldType::Enum(e) => Some(e.full_name()),
            FieldType::Fixed(f) => Some(f.full_name()),
            _ => None,
        }
    }

    /// Null itself, or a union containing null
    pub fn is_nullable(&self) -> bool {
        match self {
            FieldType::Null => true,
            FieldType::Union(branches) => branches.iter().any(|b| *b == FieldType::Null),
            _ => false,
        }
    }

    /// The single non-null member of a nullable union, or the type itself.
    ///
    /// Returns `None` for `null` and for unions with more than one non-null
    /// branch.
    pub fn non_null(&self) -> Option<&FieldType> {
        match self {
            FieldType::Null => None,
            FieldType::Union(branches) => {
                let mut non_null = branches.iter().filter(|b| **b != FieldType::Null);
                match (non_null.next(), non_null.next()) {
                    (Some(only), None) => Some(only),
                    _ => None,
                }
            }
            other => Some(other),
        }
    }
}

fn record_to_json(
    record: &RecordSchema,
    enclosing: Option<&str>,
    seen: &mut HashSet<String>,
) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), json!("record"));
    if let Some(name) = &record.name {
        obj.insert("name".to_string(), json!(name));
    }
    if let Some(full_name) = record.full_name() {
        seen.insert(full_name);
    }
    insert_namespace(&mut obj, record.namespace.as_deref(), enclosing);
    if let Some(doc) = &record.doc {
        obj.insert("doc".to_string(), json!(doc));
    }

    let namespace = record.namespace.as_deref();
    let fields: Vec<Value> = record
        .fields
        .iter()
        .map(|field| {
            let mut f = Map::new();
            f.insert("name".to_string(), json!(field.name));
            f.insert(
                "type".to_string(),
                type_to_json(&field.field_type, namespace, seen),
            );
            if let Some(doc) = &field.doc {
                f.insert("doc".to_string(), json!(doc));
            }
            Value::Object(f)
        })
        .collect();
    obj.insert("fields".to_string(), Value::Array(fields));

    Value::Object(obj)
}

/// Written only where it differs from the namespace a parser would inherit
fn insert_namespace(
    obj: &mut Map<String, Value>,
    namespace: Option<&str>,
    enclosing: Option<&str>,
) {
    if namespace != enclosing {
        obj.insert("namespace".to_string(), json!(namespace.unwrap_or("")));
    }
}

fn type_to_json(
    field_type: &FieldType,
    enclosing: Option<&str>,
    seen: &mut HashSet<String>,
) -> Value {
    // Later uses of a named type refer back to its first definition
    if let Some(full_name) = field_type.full_name() {
        if seen.contains(&full_name) {
            return json!(full_name);
        }
    }

    match field_type {
        FieldType::Record(record) => record_to_json(record, enclosing, seen),
        FieldType::Enum(e) => {
            seen.insert(e.full_name());
            let mut obj = Map::new();
            obj.insert("type".to_string(), json!("enum"));
            obj.insert("name".to_string(), json!(e.name));
            insert_namespace(&mut obj, e.namespace.as_deref(), enclosing);
            obj.insert("symbols".to_string(), json!(e.symbols));
            Value::Object(obj)
        }
        FieldType::Fixed(f) => {
            seen.insert(f.full_name());
            let mut obj = Map::new();
            obj.insert("type".to_string(), json!("fixed"));
            obj.insert("name".to_string(), json!(f.name));
            insert_namespace(&mut obj, f.namespace.as_deref(), enclosing);
            obj.insert("size".to_string(), json!(f.size));
            Value::Object(obj)
        }
        FieldType::Array(items) => {
            json!({"type": "array", "items": type_to_json(items, enclosing, seen)})
        }
        FieldType::Map(values) => {
            json!({"type": "map", "values": type_to_json(values, enclosing, seen)})
        }
        FieldType::Union(branches) => Value::Array(
            branches
                .iter()
                .map(|branch| type_to_json(branch, enclosing, seen))
                .collect(),
        ),
        primitive => json!(primitive.type_name()),
    }
}
