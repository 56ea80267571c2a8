//! Sink module
//!
//! Composes schema validation, DDL translation and compression resolution
//! into the property bag handed to the dataset layer, and drives the sink
//! lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Unconfigured ──validate──▶ Validated ──configure──▶ Configured ──initialize──▶ Active
//! ```
//!
//! Records can only be transformed once the sink is `Active`.

mod configurator;
mod parquet_sink;
pub mod properties;

pub use configurator::build_properties;
pub use parquet_sink::{BatchSink, ParquetSink, SinkState};
pub use properties::PropertyBag;

#[cfg(test)]
mod tests;
