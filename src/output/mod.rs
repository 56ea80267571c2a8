//! Output module
//!
//! Local write path for transformed records.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Mapping a validated schema to an Arrow schema
//! - Assembling output records into Arrow RecordBatches
//! - Writing Parquet files with the resolved compression codec

mod batch;
mod writer;

pub use batch::{records_to_batch, to_arrow_schema};
pub use writer::{write_records_to_parquet, ParquetWriter, ParquetWriterConfig};
