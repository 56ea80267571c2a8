//! Error types for the fileset sink
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the fileset sink
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("Unable to parse schema: {message}")]
    SchemaParse { message: String },

    #[error("Unsupported type for field '{field}': {type_name} has no DDL equivalent")]
    UnsupportedType { field: String, type_name: String },

    // ============================================================================
    // Compression Errors
    // ============================================================================
    #[error("Unsupported compression codec '{codec}'")]
    InvalidCodec { codec: String },

    // ============================================================================
    // Record Errors
    // ============================================================================
    #[error("Failed to transform field '{field}': {message}")]
    Transform { field: String, message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Undefined macro: {variable}")]
    UndefinedVariable { variable: String },

    #[error("Sink is {state}, expected {expected}")]
    InvalidState { state: String, expected: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a schema parse error
    pub fn schema_parse(message: impl Into<String>) -> Self {
        Self::SchemaParse {
            message: message.into(),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            type_name: type_name.into(),
        }
    }

    /// Create an invalid codec error
    pub fn invalid_codec(codec: impl Into<String>) -> Self {
        Self::InvalidCodec {
            codec: codec.into(),
        }
    }

    /// Create a transform error
    pub fn transform(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an undefined macro error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(state: impl ToString, expected: impl ToString) -> Self {
        Self::InvalidState {
            state: state.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether this error is raised while the sink is being configured,
    /// before any record flows.
    pub fn is_config_time(&self) -> bool {
        matches!(
            self,
            Error::SchemaParse { .. }
                | Error::UnsupportedType { .. }
                | Error::InvalidCodec { .. }
                | Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::UndefinedVariable { .. }
                | Error::YamlParse(_)
        )
    }
}

/// Result type alias for the fileset sink
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::schema_parse("expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "Unable to parse schema: expected value at line 1 column 1"
        );

        let err = Error::invalid_codec("bzip3");
        assert_eq!(err.to_string(), "Unsupported compression codec 'bzip3'");

        let err = Error::transform("id", "missing required value");
        assert_eq!(
            err.to_string(),
            "Failed to transform field 'id': missing required value"
        );

        let err = Error::unsupported_type("payload", "null");
        assert!(err.to_string().contains("payload"));
    }

    #[test]
    fn test_is_config_time() {
        assert!(Error::schema_parse("bad").is_config_time());
        assert!(Error::unsupported_type("a", "null").is_config_time());
        assert!(Error::invalid_codec("bzip3").is_config_time());
        assert!(Error::missing_field("schema").is_config_time());
        assert!(Error::undefined_var("schema").is_config_time());

        assert!(!Error::transform("id", "bad").is_config_time());
        assert!(!Error::output("disk full").is_config_time());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
