//! Property assembly for dataset creation

use crate::compression;
use crate::config::SinkConfig;
use crate::ddl;
use crate::error::Result;
use crate::schema::{self, Schema};
use crate::sink::properties::{
    PropertyBag, BASE_PATH, EXPLORE_ENABLED, EXPLORE_FORMAT, EXPLORE_SCHEMA, INPUT_FORMAT,
    OUTPUT_FORMAT, PARQUET_INPUT_FORMAT, PARQUET_OUTPUT_FORMAT, RESERVED_KEYS, SCHEMA,
};
use tracing::{debug, warn};

/// Validate the config and build the full dataset property bag.
///
/// Performs no I/O. Fails on the first invalid schema, unsupported type or
/// unknown codec, before any property is handed out.
pub fn build_properties(config: &SinkConfig) -> Result<PropertyBag> {
    let schema = schema::validate(&config.schema)?;
    assemble_properties(config, &schema)
}

/// Build the property bag for a config whose schema already validated
pub(crate) fn assemble_properties(config: &SinkConfig, schema: &Schema) -> Result<PropertyBag> {
    let canonical = config.schema.to_lowercase();
    let ddl = ddl::to_ddl(schema)?;
    let compression = compression::resolve(config.compression_codec.as_deref(), &canonical)?;

    let mut properties = PropertyBag::new();

    // User properties go first so the sink's own keys always win
    for (key, value) in config.file_properties()? {
        if RESERVED_KEYS.contains(&key.as_str()) || compression.properties.contains_key(&key) {
            warn!(
                dataset = %config.name,
                key = %key,
                "File property is overridden by the sink"
            );
        }
        properties.insert(key, value);
    }

    properties.insert(SCHEMA, canonical);
    properties.insert(EXPLORE_SCHEMA, ddl.column_list());
    properties.insert(EXPLORE_ENABLED, "true");
    properties.insert(EXPLORE_FORMAT, "parquet");
    properties.insert(INPUT_FORMAT, PARQUET_INPUT_FORMAT);
    properties.insert(OUTPUT_FORMAT, PARQUET_OUTPUT_FORMAT);
    properties.extend(compression.properties);

    if let Some(base_path) = &config.base_path {
        properties.insert(BASE_PATH, base_path.clone());
    }

    debug!(
        dataset = %config.name,
        codec = %compression.codec,
        columns = ddl.columns().len(),
        "Built dataset properties"
    );
    Ok(properties)
}
