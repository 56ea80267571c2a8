//! Schema and record conversion to Arrow
//!
//! Maps a validated schema to an Arrow schema and assembles output records
//! into RecordBatches for the Parquet writer.

use crate::error::{Error, Result};
use crate::schema::{FieldType, Schema};
use crate::transform::{Datum, GenericRecord};
use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, FixedSizeBinaryArray, Float32Array, Float64Array,
    Int32Array, Int64Array, ListArray, MapArray, NullArray, StringArray, StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field, Fields, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Stand-in for values absent from a record
static NULL_DATUM: Datum = Datum::Null;

/// Map a validated schema to an Arrow schema.
///
/// Unions with more than one non-null branch have no Arrow column form here.
pub fn to_arrow_schema(schema: &Schema) -> Result<ArrowSchema> {
    let fields = schema
        .fields()
        .iter()
        .map(|field| arrow_field(&field.name, &field.field_type))
        .collect::<Result<Vec<_>>>()?;
    Ok(ArrowSchema::new(fields))
}

fn arrow_field(name: &str, field_type: &FieldType) -> Result<Field> {
    let nullable = field_type.is_nullable();
    let data_type = match field_type {
        FieldType::Null => DataType::Null,
        FieldType::Union(_) => match field_type.non_null() {
            Some(inner) => arrow_type(inner, name)?,
            None => {
                return Err(Error::output(format!(
                    "field '{name}' is a union with several non-null branches"
                )))
            }
        },
        other => arrow_type(other, name)?,
    };
    Ok(Field::new(name, data_type, nullable))
}

fn arrow_type(field_type: &FieldType, name: &str) -> Result<DataType> {
    let data_type = match field_type {
        FieldType::Boolean => DataType::Boolean,
        FieldType::Int => DataType::Int32,
        FieldType::Long => DataType::Int64,
        FieldType::Float => DataType::Float32,
        FieldType::Double => DataType::Float64,
        FieldType::Bytes => DataType::Binary,
        FieldType::String | FieldType::Enum(_) => DataType::Utf8,
        FieldType::Fixed(fixed) => {
            let size = i32::try_from(fixed.size).map_err(|_| {
                Error::output(format!("fixed size {} is too large", fixed.size))
            })?;
            DataType::FixedSizeBinary(size)
        }
        FieldType::Array(items) => DataType::List(Arc::new(arrow_field("item", items)?)),
        FieldType::Map(values) => {
            let entries = Fields::from(vec![
                Field::new("key", DataType::Utf8, false),
                arrow_field("value", values)?,
            ]);
            DataType::Map(
                Arc::new(Field::new("entries", DataType::Struct(entries), false)),
                false,
            )
        }
        FieldType::Record(record) => {
            let fields = record
                .fields
                .iter()
                .map(|f| arrow_field(&f.name, &f.field_type))
                .collect::<Result<Vec<_>>>()?;
            DataType::Struct(Fields::from(fields))
        }
        FieldType::Null | FieldType::Union(_) => {
            return arrow_field(name, field_type).map(|f| f.data_type().clone())
        }
    };
    Ok(data_type)
}

/// Assemble output records into a RecordBatch
pub fn records_to_batch(records: &[GenericRecord], schema: &Schema) -> Result<RecordBatch> {
    let arrow_schema = Arc::new(to_arrow_schema(schema)?);

    if records.is_empty() {
        return Ok(RecordBatch::new_empty(arrow_schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(arrow_schema.fields().len());
    for (index, field) in arrow_schema.fields().iter().enumerate() {
        let values: Vec<&Datum> = records
            .iter()
            .map(|record| record.get_index(index).unwrap_or(&NULL_DATUM))
            .collect();
        columns.push(build_array(&values, field.data_type())?);
    }

    RecordBatch::try_new(arrow_schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Build an Arrow array from one column of values
fn build_array(values: &[&Datum], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values
                .iter()
                .map(|v| match v {
                    Datum::Boolean(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int32 => {
            let arr: Int32Array = values
                .iter()
                .map(|v| match v {
                    Datum::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values
                .iter()
                .map(|v| match v {
                    Datum::Long(l) => Some(*l),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float32 => {
            let arr: Float32Array = values
                .iter()
                .map(|v| match v {
                    Datum::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| match v {
                    Datum::Double(d) => Some(*d),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| match v {
                    Datum::String(s) | Datum::Enum(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Binary => {
            let arr: BinaryArray = values
                .iter()
                .map(|v| match v {
                    Datum::Bytes(b) => Some(&b[..]),
                    _ => None,
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::FixedSizeBinary(size) => {
            let iter = values.iter().map(|v| match v {
                Datum::Fixed(b) => Some(&b[..]),
                _ => None,
            });
            let arr = FixedSizeBinaryArray::try_from_sparse_iter_with_size(iter, *size)?;
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Map(field, _) => build_map_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        other => Err(Error::output(format!(
            "no array builder for Arrow type {other}"
        ))),
    }
}

/// Validity bitmap: a row is valid when `is_valid` holds for its value
fn null_buffer(values: &[&Datum], is_valid: impl Fn(&Datum) -> bool) -> Option<NullBuffer> {
    let validity: Vec<bool> = values.iter().map(|v| is_valid(*v)).collect();
    if validity.iter().all(|valid| *valid) {
        None
    } else {
        Some(NullBuffer::from(validity))
    }
}

fn offset(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::Output {
        message: "Array too large for i32 offset".to_string(),
    })
}

/// Build a list array from array values
fn build_list_array(values: &[&Datum], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<&Datum> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];

    for value in values {
        if let Datum::Array(items) = value {
            all_items.extend(items.iter());
        }
        // Null rows still need an offset
        offsets.push(offset(all_items.len())?);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let nulls = null_buffer(values, |v| matches!(v, Datum::Array(_)));

    let list_array = ListArray::try_new(
        Arc::clone(field),
        OffsetBuffer::new(offsets.into()),
        items_array,
        nulls,
    )?;
    Ok(Arc::new(list_array))
}

/// Build a map array from map values
fn build_map_array(values: &[&Datum], field: &Arc<Field>) -> Result<ArrayRef> {
    let DataType::Struct(entry_fields) = field.data_type() else {
        return Err(Error::output("map entries must be a struct"));
    };
    let value_type = entry_fields
        .get(1)
        .map(|f| f.data_type().clone())
        .ok_or_else(|| Error::output("map entries need a value field"))?;

    let mut keys: Vec<&str> = Vec::new();
    let mut items: Vec<&Datum> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];

    for value in values {
        if let Datum::Map(entries) = value {
            for (key, item) in entries {
                keys.push(key.as_str());
                items.push(item);
            }
        }
        offsets.push(offset(keys.len())?);
    }

    let key_array: ArrayRef = Arc::new(StringArray::from(keys));
    let value_array = build_array(&items, &value_type)?;
    let entries = StructArray::try_new(entry_fields.clone(), vec![key_array, value_array], None)?;
    let nulls = null_buffer(values, |v| matches!(v, Datum::Map(_)));

    let map_array = MapArray::try_new(
        Arc::clone(field),
        OffsetBuffer::new(offsets.into()),
        entries,
        nulls,
        false,
    )?;
    Ok(Arc::new(map_array))
}

/// Build a struct array from nested records
fn build_struct_array(values: &[&Datum], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        let child_values: Vec<&Datum> = values
            .iter()
            .map(|v| match v {
                Datum::Record(record) => record.get_index(index).unwrap_or(&NULL_DATUM),
                _ => &NULL_DATUM,
            })
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let nulls = null_buffer(values, |v| matches!(v, Datum::Record(_)));
    let struct_array = StructArray::try_new(fields.clone(), child_arrays, nulls)?;
    Ok(Arc::new(struct_array))
}
