//! Dataset property bag

use crate::types::StringMap;
use serde::{Deserialize, Serialize};

/// Canonical (lower-cased) schema text
pub const SCHEMA: &str = "schema";

/// DDL column list registered with the query engine
pub const EXPLORE_SCHEMA: &str = "explore.schema";

/// Whether the dataset is registered with the query engine on creation
pub const EXPLORE_ENABLED: &str = "explore.enabled";

/// File format the query engine reads
pub const EXPLORE_FORMAT: &str = "explore.format";

/// Input format selector for reading the dataset back
pub const INPUT_FORMAT: &str = "input.format";

/// Output format selector for writing the dataset
pub const OUTPUT_FORMAT: &str = "output.format";

/// Storage location override
pub const BASE_PATH: &str = "base.path";

/// Input format for Avro records stored as Parquet
pub const PARQUET_INPUT_FORMAT: &str = "org.apache.parquet.avro.AvroParquetInputFormat";

/// Output format for Avro records stored as Parquet
pub const PARQUET_OUTPUT_FORMAT: &str = "org.apache.parquet.avro.AvroParquetOutputFormat";

/// Keys the sink always sets itself
pub const RESERVED_KEYS: [&str; 6] = [
    SCHEMA,
    EXPLORE_SCHEMA,
    EXPLORE_ENABLED,
    EXPLORE_FORMAT,
    INPUT_FORMAT,
    OUTPUT_FORMAT,
];

/// Flat string properties handed to the dataset layer at creation time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    properties: StringMap,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    /// Merge properties, later values win
    pub fn extend<I, K, V>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn schema(&self) -> Option<&str> {
        self.get(SCHEMA)
    }

    pub fn explore_schema(&self) -> Option<&str> {
        self.get(EXPLORE_SCHEMA)
    }

    pub fn is_explore_enabled(&self) -> bool {
        self.get(EXPLORE_ENABLED) == Some("true")
    }

    pub fn input_format(&self) -> Option<&str> {
        self.get(INPUT_FORMAT)
    }

    pub fn output_format(&self) -> Option<&str> {
        self.get(OUTPUT_FORMAT)
    }

    /// Properties in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn into_inner(self) -> StringMap {
        self.properties
    }
}
