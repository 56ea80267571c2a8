// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # Fileset Sink
//!
//! Configuration and record-conversion core of a batch sink that lands
//! records as a Parquet-backed, SQL-queryable fileset.
//!
//! ## Features
//!
//! - **Schema Validation**: Parse Avro-style JSON record schemas into a typed model
//! - **DDL Translation**: Render the schema as a Hive column list for exploration
//! - **Compression**: Map codec names to writer and table properties
//! - **Record Transform**: Convert JSON input records into schema-shaped records
//! - **Parquet Output**: Write transformed records with Arrow and Parquet
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fileset_sink::{BatchSink, ParquetSink, SinkConfig};
//!
//! let config = SinkConfig::new(
//!     "users",
//!     None,
//!     r#"{"type":"record","name":"user","fields":[{"name":"id","type":"int"}]}"#,
//!     Some("snappy".to_string()),
//! );
//!
//! let mut sink = ParquetSink::new(config);
//! let properties = sink.configure()?;
//! sink.initialize()?;
//!
//! let input = serde_json::json!({"id": 1});
//! let record = sink.transform(input.as_object().unwrap())?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Sink Lifecycle                           │
//! │  validate() → Schema   configure() → Properties   initialize()  │
//! │  transform(record) → GenericRecord                              │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Schema  │    DDL    │  Compression  │ Transform │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Parse    │ Columns   │ Codec names   │ Coercion  │ Arrow       │
//! │ Names    │ Nested    │ Writer props  │ Unions    │ Parquet     │
//! │ Unions   │ Unions    │ Table props   │ Nesting   │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the sink
pub mod error;

/// Common types and type aliases
pub mod types;

/// Record schema parsing and validation
pub mod schema;

/// Hive DDL translation
pub mod ddl;

/// Compression codec resolution
pub mod compression;

/// JSON to schema-shaped record conversion
pub mod transform;

/// Macro substitution for late-bound config values
pub mod template;

/// Sink configuration
pub mod config;

/// Sink lifecycle and dataset properties
pub mod sink;

/// Arrow/Parquet output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use compression::{resolve, CompressionCodec, CompressionProperties};
pub use config::{load_config, load_config_from_str, RawSinkConfig, SinkConfig};
pub use ddl::{to_ddl, DdlSchema};
pub use schema::{validate, Schema};
pub use sink::{build_properties, BatchSink, ParquetSink, PropertyBag, SinkState};
pub use template::MacroContext;
pub use transform::{transform, Datum, GenericRecord, RecordTransformer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
