//! Sink configuration
//!
//! Configuration is two-phase. A [`RawSinkConfig`] is loaded from YAML or
//! JSON and may still contain `${key}` macros in its schema. Calling
//! [`RawSinkConfig::resolve`] with a [`MacroContext`] substitutes them and
//! produces a validated, immutable [`SinkConfig`].
//!
//! ```yaml
//! name: users
//! basePath: /data/users
//! schema: '{"type":"record","name":"user","fields":[{"name":"id","type":"long"}]}'
//! compressionCodec: snappy
//! ```

use crate::compression;
use crate::ddl;
use crate::error::{Error, Result};
use crate::schema;
use crate::template::{self, MacroContext};
use crate::types::{JsonValue, StringMap};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Dataset names: letters, digits, `_`, `.` and `-`
static DATASET_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid dataset name regex"));

// ============================================================================
// Raw Config
// ============================================================================

/// Sink configuration as written by the pipeline author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSinkConfig {
    /// Dataset name
    #[serde(default)]
    pub name: Option<String>,

    /// Storage location override
    #[serde(default, alias = "base_path")]
    pub base_path: Option<String>,

    /// Schema text, possibly containing macros
    #[serde(default)]
    pub schema: Option<String>,

    /// Compression codec name
    #[serde(default, alias = "compression_codec")]
    pub compression_codec: Option<String>,

    /// Extra dataset properties as a JSON object of strings
    #[serde(default, alias = "file_properties")]
    pub file_properties: Option<String>,
}

impl RawSinkConfig {
    /// Whether the schema can only be checked once macros are resolved
    pub fn is_schema_deferred(&self) -> bool {
        self.schema.as_deref().is_some_and(template::has_macros)
    }

    /// Validate everything that is known at deployment time.
    ///
    /// A schema holding macros is skipped here and checked by [`resolve`].
    ///
    /// [`resolve`]: RawSinkConfig::resolve
    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_deref().ok_or_else(|| Error::missing_field("name"))?;
        validate_name(name)?;

        let schema_text = self
            .schema
            .as_deref()
            .ok_or_else(|| Error::missing_field("schema"))?;

        if self.is_schema_deferred() {
            debug!(
                dataset = name,
                macros = ?template::extract_macros(schema_text),
                "Schema contains macros, deferring validation"
            );
            // The codec does not depend on the schema, check it now
            compression::resolve(self.compression_codec.as_deref(), "")?;
        } else {
            check_schema(schema_text)?;
            compression::resolve(self.compression_codec.as_deref(), schema_text)?;
        }

        parse_file_properties(self.file_properties.as_deref())?;
        Ok(())
    }

    /// Substitute macros and produce a validated [`SinkConfig`]
    pub fn resolve(&self, ctx: &MacroContext) -> Result<SinkConfig> {
        let name = self.name.clone().ok_or_else(|| Error::missing_field("name"))?;
        let schema_text = self
            .schema
            .as_deref()
            .ok_or_else(|| Error::missing_field("schema"))?;

        let config = SinkConfig {
            name,
            base_path: self.base_path.clone(),
            schema: template::render(schema_text, ctx)?,
            compression_codec: self.compression_codec.clone(),
            file_properties: self.file_properties.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Resolved Config
// ============================================================================

/// Fully resolved sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    /// Dataset name
    pub name: String,

    /// Storage location override
    #[serde(default)]
    pub base_path: Option<String>,

    /// Schema text as configured (not yet lower-cased)
    pub schema: String,

    /// Compression codec name, `none` when absent
    #[serde(default)]
    pub compression_codec: Option<String>,

    /// Extra dataset properties as a JSON object of strings
    #[serde(default)]
    pub file_properties: Option<String>,
}

impl SinkConfig {
    /// Create a config without extra file properties
    pub fn new(
        name: impl Into<String>,
        base_path: Option<String>,
        schema: impl Into<String>,
        compression_codec: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_path,
            schema: schema.into(),
            compression_codec,
            file_properties: None,
        }
    }

    /// Set extra file properties
    #[must_use]
    pub fn with_file_properties(mut self, file_properties: impl Into<String>) -> Self {
        self.file_properties = Some(file_properties.into());
        self
    }

    /// Check name, schema (including its DDL form), codec and file properties
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if template::has_macros(&self.schema) {
            return Err(Error::invalid_value(
                "schema",
                "contains unresolved macros",
            ));
        }
        check_schema(&self.schema)?;
        compression::resolve(self.compression_codec.as_deref(), &self.schema)?;
        parse_file_properties(self.file_properties.as_deref())?;
        Ok(())
    }

    /// Extra dataset properties, empty when none are configured
    pub fn file_properties(&self) -> Result<StringMap> {
        parse_file_properties(self.file_properties.as_deref())
    }
}

/// The schema must parse and have a DDL form
fn check_schema(text: &str) -> Result<()> {
    ddl::to_ddl(&schema::validate(text)?)?;
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if DATASET_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(Error::invalid_value(
            "name",
            format!("'{name}' is not a valid dataset name"),
        ))
    }
}

fn parse_file_properties(text: Option<&str>) -> Result<StringMap> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(StringMap::new());
    };

    let value: JsonValue = serde_json::from_str(text).map_err(|e| {
        Error::invalid_value("fileProperties", format!("not valid JSON: {e}"))
    })?;
    let JsonValue::Object(obj) = value else {
        return Err(Error::invalid_value(
            "fileProperties",
            "expected a JSON object",
        ));
    };

    obj.into_iter()
        .map(|(key, value)| match value {
            JsonValue::String(s) => Ok((key, s)),
            other => Err(Error::invalid_value(
                "fileProperties",
                format!("value for '{key}' must be a string, found {other}"),
            )),
        })
        .collect()
}

// ============================================================================
// Loading
// ============================================================================

/// Load a raw sink config from a YAML or JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<RawSinkConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        load_config_from_str(&content)
    }
}

/// Parse a raw sink config from YAML text
pub fn load_config_from_str(yaml: &str) -> Result<RawSinkConfig> {
    Ok(serde_yaml::from_str(yaml)?)
}
