//! Compression codec resolution
//!
//! Maps the configured codec name to the dataset properties the storage
//! layer reads when writing Parquet files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Output property carrying the Avro schema for the Parquet writer
pub const PARQUET_AVRO_SCHEMA: &str = "output.properties.parquet.avro.schema";

/// Output property selecting the Parquet compression codec
pub const PARQUET_COMPRESSION: &str = "output.properties.parquet.compression";

/// Table property telling the query engine which codec the files use
pub const EXPLORE_PARQUET_COMPRESSION: &str = "explore.table.property.parquet.compression";

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// No compression
    #[default]
    None,
    Snappy,
    Gzip,
    Lzo,
    Lz4,
    Zstd,
    Brotli,
}

impl CompressionCodec {
    /// All codecs, in declaration order
    pub const ALL: [CompressionCodec; 7] = [
        CompressionCodec::None,
        CompressionCodec::Snappy,
        CompressionCodec::Gzip,
        CompressionCodec::Lzo,
        CompressionCodec::Lz4,
        CompressionCodec::Zstd,
        CompressionCodec::Brotli,
    ];

    /// Configuration name (lower case)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Snappy => "snappy",
            Self::Gzip => "gzip",
            Self::Lzo => "lzo",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
            Self::Brotli => "brotli",
        }
    }

    /// Codec name as the Parquet writer properties spell it
    pub fn parquet_name(self) -> &'static str {
        match self {
            Self::None => "UNCOMPRESSED",
            Self::Snappy => "SNAPPY",
            Self::Gzip => "GZIP",
            Self::Lzo => "LZO",
            Self::Lz4 => "LZ4",
            Self::Zstd => "ZSTD",
            Self::Brotli => "BROTLI",
        }
    }

    /// Convert to parquet compression type
    pub fn to_parquet(self) -> parquet::basic::Compression {
        use parquet::basic::Compression;

        match self {
            Self::None => Compression::UNCOMPRESSED,
            Self::Snappy => Compression::SNAPPY,
            Self::Gzip => Compression::GZIP(parquet::basic::GzipLevel::default()),
            Self::Lzo => Compression::LZO,
            Self::Lz4 => Compression::LZ4,
            Self::Zstd => Compression::ZSTD(parquet::basic::ZstdLevel::default()),
            Self::Brotli => Compression::BROTLI(parquet::basic::BrotliLevel::default()),
        }
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionCodec {
    type Err = Error;

    /// Case-sensitive: only the lower-case names are accepted
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.as_str() == s)
            .ok_or_else(|| Error::invalid_codec(s))
    }
}

/// Resolved compression settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionProperties {
    /// The selected codec
    pub codec: CompressionCodec,
    /// Properties to merge verbatim into the dataset configuration
    pub properties: BTreeMap<String, String>,
}

/// Resolve an optional codec name into compression properties.
///
/// An absent or empty name means no compression. The schema text is carried
/// into the writer properties so the Parquet writer can build its column
/// layout from it.
pub fn resolve(codec_name: Option<&str>, schema_text: &str) -> Result<CompressionProperties> {
    let codec = match codec_name {
        None | Some("") => CompressionCodec::None,
        Some(name) => name.parse()?,
    };

    let mut properties = BTreeMap::new();
    properties.insert(PARQUET_AVRO_SCHEMA.to_string(), schema_text.to_string());

    if codec != CompressionCodec::None {
        properties.insert(
            PARQUET_COMPRESSION.to_string(),
            codec.parquet_name().to_string(),
        );
        properties.insert(
            EXPLORE_PARQUET_COMPRESSION.to_string(),
            codec.parquet_name().to_string(),
        );
    }

    tracing::debug!(codec = %codec, "Resolved compression codec");
    Ok(CompressionProperties { codec, properties })
}
