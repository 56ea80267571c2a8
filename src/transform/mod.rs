//! Record transformation
//!
//! Converts structured input records (JSON objects) into typed output
//! records that follow the validated schema.
//!
//! # Coercions
//!
//! - `int` → `long`, `float`, `double`
//! - `long` → `float`, `double`
//! - `float` → `double`
//! - `string` → `bytes` (UTF-8)
//!
//! Nested records, arrays and maps are converted field by field. Errors name
//! the offending field path, e.g. `address.zip` or `tags[2]`.

mod transformer;
mod value;

pub use transformer::{transform, RecordTransformer};
pub use value::{Datum, GenericRecord};

#[cfg(test)]
mod tests;
