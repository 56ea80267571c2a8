//! Hive DDL translation
//!
//! Converts a validated [`Schema`] into the column list a query engine uses
//! to register the dataset, e.g. `id int, name string`.
//!
//! | Schema type          | DDL                 |
//! |----------------------|---------------------|
//! | boolean              | `boolean`           |
//! | int                  | `int`               |
//! | long                 | `bigint`            |
//! | float                | `float`             |
//! | double               | `double`            |
//! | string, enum         | `string`            |
//! | bytes, fixed         | `binary`            |
//! | array                | `array<T>`          |
//! | map                  | `map<string,T>`     |
//! | record               | `struct<a:T,b:U>`   |
//! | `[T, "null"]`        | DDL of `T`          |
//!
//! `null` and unions with more than one non-null branch have no DDL form.

use crate::error::{Error, Result};
use crate::schema::{FieldType, RecordSchema, Schema};
use std::fmt;

/// One DDL column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlColumn {
    pub name: String,
    pub ddl_type: String,
}

/// DDL form of a schema: one column per top-level field, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlSchema {
    columns: Vec<DdlColumn>,
}

impl DdlSchema {
    /// Columns in schema order
    pub fn columns(&self) -> &[DdlColumn] {
        &self.columns
    }

    /// Bare column-list body, without enclosing parentheses
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.ddl_type))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DdlSchema {
    /// Delimited form, `(a int, b string)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.column_list())
    }
}

/// Translate a schema into its DDL column list.
///
/// Fails with [`Error::UnsupportedType`] naming the first field whose type
/// has no DDL equivalent.
pub fn to_ddl(schema: &Schema) -> Result<DdlSchema> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            Ok(DdlColumn {
                name: field.name.clone(),
                ddl_type: ddl_type(&field.field_type, &field.name)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DdlSchema { columns })
}

/// DDL type token for a field type. `path` names the field in errors.
fn ddl_type(field_type: &FieldType, path: &str) -> Result<String> {
    let token = match field_type {
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Int => "int".to_string(),
        FieldType::Long => "bigint".to_string(),
        FieldType::Float => "float".to_string(),
        FieldType::Double => "double".to_string(),
        FieldType::String | FieldType::Enum(_) => "string".to_string(),
        FieldType::Bytes | FieldType::Fixed(_) => "binary".to_string(),
        FieldType::Array(items) => format!("array<{}>", ddl_type(items, path)?),
        FieldType::Map(values) => format!("map<string,{}>", ddl_type(values, path)?),
        FieldType::Record(record) => struct_type(record, path)?,
        FieldType::Union(branches) => match field_type.non_null() {
            Some(inner) => ddl_type(inner, path)?,
            None => {
                let names: Vec<&str> = branches.iter().map(FieldType::type_name).collect();
                return Err(Error::unsupported_type(
                    path,
                    format!("union [{}]", names.join(", ")),
                ));
            }
        },
        FieldType::Null => return Err(Error::unsupported_type(path, "null")),
    };
    Ok(token)
}

fn struct_type(record: &RecordSchema, path: &str) -> Result<String> {
    let members = record
        .fields
        .iter()
        .map(|field| {
            let field_path = format!("{path}.{}", field.name);
            Ok(format!(
                "{}:{}",
                field.name,
                ddl_type(&field.field_type, &field_path)?
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!("struct<{}>", members.join(",")))
}
