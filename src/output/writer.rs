//! Parquet file writer
//!
//! Writes output records to a local Parquet file using the codec the sink
//! resolved.

use crate::compression::CompressionCodec;
use crate::error::{Error, Result};
use crate::output::batch::{records_to_batch, to_arrow_schema};
use crate::schema::Schema;
use crate::transform::GenericRecord;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    codec: CompressionCodec,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl ParquetWriterConfig {
    /// Get the compression codec
    #[must_use]
    pub fn codec(&self) -> CompressionCodec {
        self.codec
    }

    /// Get dictionary encoding enabled
    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get statistics enabled
    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::None,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression codec
    #[must_use]
    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> Result<WriterProperties> {
        if self.codec == CompressionCodec::Lzo {
            return Err(Error::output(
                "lzo is not supported by the local Parquet writer",
            ));
        }

        let mut builder = WriterProperties::builder()
            .set_compression(self.codec.to_parquet())
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        Ok(builder.build())
    }
}

/// Parquet file writer for records of one schema
pub struct ParquetWriter {
    /// Record schema
    schema: Arc<Schema>,
    /// Arrow writer
    writer: ArrowWriter<File>,
    /// Number of rows written
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: Arc<Schema>,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let arrow_schema = Arc::new(to_arrow_schema(&schema)?);
        let props = config.build_properties()?;

        let file = File::create(path.as_ref()).map_err(|e| Error::Output {
            message: format!("Failed to create file: {e}"),
        })?;

        let writer = ArrowWriter::try_new(file, arrow_schema, Some(props)).map_err(|e| {
            Error::Output {
                message: format!("Failed to create Parquet writer: {e}"),
            }
        })?;

        debug!(
            path = %path.as_ref().display(),
            codec = %config.codec(),
            "Opened Parquet writer"
        );
        Ok(Self {
            schema,
            writer,
            rows_written: 0,
        })
    }

    /// Write output records as one batch
    pub fn write_records(&mut self, records: &[GenericRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let batch = records_to_batch(records, &self.schema)?;
        self.write(&batch)
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch: {e}"),
        })?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }
}

/// Write output records to a Parquet file in one call
pub fn write_records_to_parquet(
    path: impl AsRef<Path>,
    schema: Arc<Schema>,
    records: &[GenericRecord],
    config: Option<&ParquetWriterConfig>,
) -> Result<usize> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::new(path, schema, config)?;
    writer.write_records(records)?;
    writer.close()
}
