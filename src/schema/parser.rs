//! Schema text parsing and validation
//!
//! Schemas are JSON documents in the Avro style:
//!
//! ```json
//! {"type": "record", "name": "user", "fields": [
//!     {"name": "id", "type": "long"},
//!     {"name": "email", "type": ["string", "null"]}
//! ]}
//! ```
//!
//! The whole text is lower-cased before parsing, so field names and type
//! tags are case-insensitive.

use crate::error::{Error, Result};
use crate::schema::types::{
    qualify, EnumSchema, Field, FieldType, FixedSchema, RecordSchema, Schema,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::LazyLock;

/// Field and enum symbol names
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("valid name regex"));

/// Named type names, optionally dotted
static FULL_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)*$").expect("valid full name regex")
});

/// Lower-case and parse a schema definition.
///
/// Fails with [`Error::SchemaParse`] when the text is not valid JSON or the
/// field/type structure is not well-formed.
pub fn validate(text: &str) -> Result<Schema> {
    let canonical = text.to_lowercase();
    let value: Value = serde_json::from_str(&canonical)
        .map_err(|e| Error::schema_parse(format!("invalid JSON: {e}")))?;

    SchemaParser::default().parse_root(&value)
}

impl FromStr for Schema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate(s)
    }
}

/// Single-use parser. Holds the named types seen so far in one document,
/// keyed by full name, and the namespace of the record being parsed.
#[derive(Default)]
struct SchemaParser {
    named: HashMap<String, FieldType>,
    namespace: Option<String>,
}

impl SchemaParser {
    fn parse_root(&mut self, value: &Value) -> Result<Schema> {
        let Value::Object(obj) = value else {
            return Err(Error::schema_parse("top-level schema must be a record object"));
        };

        match obj.get("type") {
            None if obj.contains_key("fields") => {}
            Some(Value::String(t)) if t == "record" => {}
            Some(other) => {
                return Err(Error::schema_parse(format!(
                    "top-level schema must be a record, found {other}"
                )))
            }
            None => return Err(Error::schema_parse("top-level schema has no 'fields'")),
        }

        let record = self.parse_record(obj, "", true)?;
        if let Some(name) = record.full_name() {
            if self.named.contains_key(&name) {
                return Err(Error::schema_parse(format!(
                    "type '{name}' is defined more than once"
                )));
            }
        }
        Ok(Schema::new(record))
    }

    fn parse_type(&mut self, value: &Value, path: &str) -> Result<FieldType> {
        match value {
            Value::String(tag) => self.parse_tag(tag, path),
            Value::Array(branches) => self.parse_union(branches, path),
            Value::Object(obj) => self.parse_complex(obj, path),
            other => Err(Error::schema_parse(format!(
                "invalid type {other} for '{}'",
                display_path(path)
            ))),
        }
    }

    /// Primitive tag or named type reference.
    ///
    /// A short name resolves in the enclosing namespace first, then as a
    /// full name.
    fn parse_tag(&self, tag: &str, path: &str) -> Result<FieldType> {
        if let Some(primitive) = FieldType::primitive(tag) {
            return Ok(primitive);
        }

        let in_namespace = match &self.namespace {
            Some(ns) if !tag.contains('.') => self.named.get(&qualify(Some(ns.as_str()), tag)),
            _ => None,
        };
        in_namespace.or_else(|| self.named.get(tag)).cloned().ok_or_else(|| {
            Error::schema_parse(format!(
                "unknown type '{tag}' for '{}'",
                display_path(path)
            ))
        })
    }

    fn parse_union(&mut self, branches: &[Value], path: &str) -> Result<FieldType> {
        if branches.is_empty() {
            return Err(Error::schema_parse(format!(
                "empty union for '{}'",
                display_path(path)
            )));
        }

        let mut parsed = Vec::with_capacity(branches.len());
        let mut kinds = HashSet::new();
        for branch in branches {
            let branch_type = self.parse_type(branch, path)?;
            if matches!(branch_type, FieldType::Union(_)) {
                return Err(Error::schema_parse(format!(
                    "nested union for '{}'",
                    display_path(path)
                )));
            }
            // Unnamed types may appear once per union, named types once per name
            let kind = branch_type
                .full_name()
                .unwrap_or_else(|| branch_type.type_name().to_string());
            if !kinds.insert(kind.clone()) {
                return Err(Error::schema_parse(format!(
                    "duplicate '{kind}' in union for '{}'",
                    display_path(path)
                )));
            }
            parsed.push(branch_type);
        }

        Ok(FieldType::Union(parsed))
    }

    fn parse_complex(&mut self, obj: &Map<String, Value>, path: &str) -> Result<FieldType> {
        let tag = match obj.get("type") {
            Some(Value::String(tag)) => tag.as_str(),
            Some(_) => {
                return Err(Error::schema_parse(format!(
                    "'type' must be a string for '{}'",
                    display_path(path)
                )))
            }
            None => {
                return Err(Error::schema_parse(format!(
                    "missing 'type' for '{}'",
                    display_path(path)
                )))
            }
        };

        match tag {
            "record" | "error" => {
                let record = self.parse_record(obj, path, false)?;
                let field_type = FieldType::Record(record);
                self.register(&field_type)?;
                Ok(field_type)
            }
            "enum" => {
                let (name, namespace) = self.required_name(obj, path)?;
                let symbols = parse_symbols(obj, path)?;
                let field_type = FieldType::Enum(EnumSchema {
                    name,
                    namespace,
                    symbols,
                });
                self.register(&field_type)?;
                Ok(field_type)
            }
            "fixed" => {
                let (name, namespace) = self.required_name(obj, path)?;
                let size = obj
                    .get("size")
                    .and_then(Value::as_u64)
                    .and_then(|s| usize::try_from(s).ok())
                    .ok_or_else(|| {
                        Error::schema_parse(format!(
                            "fixed type for '{}' needs a non-negative 'size'",
                            display_path(path)
                        ))
                    })?;
                let field_type = FieldType::Fixed(FixedSchema {
                    name,
                    namespace,
                    size,
                });
                self.register(&field_type)?;
                Ok(field_type)
            }
            "array" => {
                let items = obj.get("items").ok_or_else(|| {
                    Error::schema_parse(format!(
                        "array type for '{}' has no 'items'",
                        display_path(path)
                    ))
                })?;
                let items = self.parse_type(items, &format!("{path}[]"))?;
                Ok(FieldType::Array(Box::new(items)))
            }
            "map" => {
                let values = obj.get("values").ok_or_else(|| {
                    Error::schema_parse(format!(
                        "map type for '{}' has no 'values'",
                        display_path(path)
                    ))
                })?;
                let values = self.parse_type(values, &format!("{path}{{}}"))?;
                Ok(FieldType::Map(Box::new(values)))
            }
            other => self.parse_tag(other, path),
        }
    }

    fn parse_record(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        top_level: bool,
    ) -> Result<RecordSchema> {
        let (name, namespace) = if top_level {
            self.resolve_name(obj, path)?
        } else {
            let (name, namespace) = self.required_name(obj, path)?;
            (Some(name), namespace)
        };

        let Some(Value::Array(raw_fields)) = obj.get("fields") else {
            return Err(Error::schema_parse(format!(
                "record '{}' needs a 'fields' array",
                name.as_deref().unwrap_or("<root>")
            )));
        };

        let enclosing = std::mem::replace(&mut self.namespace, namespace.clone());
        let fields = self.parse_fields(raw_fields, path);
        self.namespace = enclosing;

        Ok(RecordSchema {
            name,
            namespace,
            doc: string_attr(obj, "doc"),
            fields: fields?,
        })
    }

    fn parse_fields(&mut self, raw_fields: &[Value], path: &str) -> Result<Vec<Field>> {
        let mut names = HashSet::new();
        let mut fields = Vec::with_capacity(raw_fields.len());
        for raw in raw_fields {
            let Value::Object(field_obj) = raw else {
                return Err(Error::schema_parse(format!(
                    "field definitions must be objects, found {raw}"
                )));
            };

            let field_name = match field_obj.get("name") {
                Some(Value::String(n)) if NAME_REGEX.is_match(n) => n.clone(),
                Some(other) => {
                    return Err(Error::schema_parse(format!("invalid field name {other}")))
                }
                None => return Err(Error::schema_parse("field definition has no 'name'")),
            };
            let field_path = join_path(path, &field_name);

            if !names.insert(field_name.clone()) {
                return Err(Error::schema_parse(format!(
                    "duplicate field '{}'",
                    display_path(&field_path)
                )));
            }

            let raw_type = field_obj.get("type").ok_or_else(|| {
                Error::schema_parse(format!("field '{field_path}' has no 'type'"))
            })?;
            let field_type = self.parse_type(raw_type, &field_path)?;

            fields.push(Field {
                name: field_name,
                field_type,
                doc: string_attr(field_obj, "doc"),
            });
        }

        Ok(fields)
    }

    /// Short name and effective namespace of a named type.
    ///
    /// A dotted name carries its own namespace. Otherwise an explicit
    /// `namespace` applies (`""` meaning none), else the enclosing one.
    fn resolve_name(
        &self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<(Option<String>, Option<String>)> {
        let namespace = match obj.get("namespace") {
            None => self.namespace.clone(),
            Some(Value::String(ns)) if ns.is_empty() => None,
            Some(Value::String(ns)) if FULL_NAME_REGEX.is_match(ns) => Some(ns.clone()),
            Some(other) => {
                return Err(Error::schema_parse(format!(
                    "invalid namespace {other} for '{}'",
                    display_path(path)
                )))
            }
        };

        match optional_name(obj, path)? {
            Some(name) => match name.rsplit_once('.') {
                Some((ns, short)) => Ok((Some(short.to_string()), Some(ns.to_string()))),
                None => Ok((Some(name), namespace)),
            },
            None => Ok((None, namespace)),
        }
    }

    fn required_name(
        &self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<(String, Option<String>)> {
        match self.resolve_name(obj, path)? {
            (Some(name), namespace) => Ok((name, namespace)),
            (None, _) => Err(Error::schema_parse(format!(
                "named type for '{}' has no 'name'",
                display_path(path)
            ))),
        }
    }

    fn register(&mut self, field_type: &FieldType) -> Result<()> {
        let Some(name) = field_type.full_name() else {
            return Ok(());
        };
        if FieldType::primitive(&name).is_some() || self.named.contains_key(&name) {
            return Err(Error::schema_parse(format!(
                "type '{name}' is defined more than once"
            )));
        }
        self.named.insert(name, field_type.clone());
        Ok(())
    }
}

fn optional_name(obj: &Map<String, Value>, path: &str) -> Result<Option<String>> {
    match obj.get("name") {
        None => Ok(None),
        Some(Value::String(n)) if FULL_NAME_REGEX.is_match(n) => Ok(Some(n.clone())),
        Some(other) => Err(Error::schema_parse(format!(
            "invalid type name {other} for '{}'",
            display_path(path)
        ))),
    }
}

fn parse_symbols(obj: &Map<String, Value>, path: &str) -> Result<Vec<String>> {
    let Some(Value::Array(raw)) = obj.get("symbols") else {
        return Err(Error::schema_parse(format!(
            "enum for '{}' needs a 'symbols' array",
            display_path(path)
        )));
    };

    let mut seen = HashSet::new();
    let mut symbols = Vec::with_capacity(raw.len());
    for symbol in raw {
        match symbol {
            Value::String(s) if NAME_REGEX.is_match(s) && seen.insert(s.clone()) => {
                symbols.push(s.clone());
            }
            other => {
                return Err(Error::schema_parse(format!(
                    "invalid or duplicate enum symbol {other} for '{}'",
                    display_path(path)
                )))
            }
        }
    }

    if symbols.is_empty() {
        return Err(Error::schema_parse(format!(
            "enum for '{}' has no symbols",
            display_path(path)
        )));
    }
    Ok(symbols)
}

fn string_attr(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
