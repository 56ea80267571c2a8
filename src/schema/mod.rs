//! Schema module
//!
//! Parses and validates the record schema a sink writes.
//!
//! # Features
//!
//! - **Case normalization**: Schema text is lower-cased before parsing
//! - **Structural checks**: Unique field names, known type tags, valid unions
//! - **Named types**: Records, enums and fixed types can be referenced by name
//! - **Round-trip**: A parsed schema serializes back to text that parses to
//!   the same schema

mod parser;
mod types;

pub use parser::validate;
pub use types::{EnumSchema, Field, FieldType, FixedSchema, RecordSchema, Schema};
