//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::compression::{self, CompressionCodec};
use crate::config::{load_config, SinkConfig};
use crate::ddl;
use crate::error::{Error, Result, ResultExt};
use crate::output::{ParquetWriter, ParquetWriterConfig};
use crate::sink::{BatchSink, ParquetSink};
use crate::template::MacroContext;
use crate::types::JsonValue;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Properties { pretty } => self.properties(*pretty),
            Commands::Ddl { delimited } => self.ddl(*delimited),
            Commands::Write {
                input,
                output,
                batch_size,
            } => self.write(input, output, *batch_size),
        }
    }

    /// Load, validate and resolve the sink config
    fn load_config(&self) -> Result<SinkConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;

        let raw = load_config(path)?;
        raw.validate()?;
        raw.resolve(&self.macro_context()?)
    }

    fn macro_context(&self) -> Result<MacroContext> {
        let mut ctx = MacroContext::new();
        for pair in &self.cli.macros {
            let (key, value) = MacroContext::parse_pair(pair)?;
            ctx.set(key, value);
        }
        Ok(ctx)
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let mut sink = ParquetSink::new(config);
        sink.configure()?;
        println!("Sink '{}' is valid", sink.config().name);
        Ok(())
    }

    fn properties(&self, pretty: bool) -> Result<()> {
        let mut sink = ParquetSink::new(self.load_config()?);
        let properties = sink.configure()?;

        let json = if pretty {
            serde_json::to_string_pretty(&properties)?
        } else {
            serde_json::to_string(&properties)?
        };
        println!("{json}");
        Ok(())
    }

    fn ddl(&self, delimited: bool) -> Result<()> {
        let mut sink = ParquetSink::new(self.load_config()?);
        let schema = sink.validate()?;
        let ddl = ddl::to_ddl(&schema)?;

        if delimited {
            println!("{ddl}");
        } else {
            println!("{}", ddl.column_list());
        }
        Ok(())
    }

    fn write(&self, input: &Path, output: &Path, batch_size: usize) -> Result<()> {
        let start = Instant::now();
        let config = self.load_config()?;
        let codec = compression::resolve(config.compression_codec.as_deref(), "")?.codec;

        let mut sink = ParquetSink::new(config);
        sink.configure()?;
        sink.initialize()?;

        // Rows land in a sibling file that replaces `output` only once closed
        let partial = partial_path(output)?;
        let result = write_jsonl(&sink, codec, input, &partial, batch_size).and_then(|rows| {
            fs::rename(&partial, output)?;
            Ok(rows)
        });

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                if partial.exists() {
                    if let Err(cleanup) = fs::remove_file(&partial) {
                        warn!(
                            path = %partial.display(),
                            error = %cleanup,
                            "Failed to remove partial output"
                        );
                    }
                }
                return Err(e);
            }
        };

        info!(
            rows,
            output = %output.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Wrote Parquet file"
        );
        println!("Wrote {rows} records to {}", output.display());
        Ok(())
    }
}

/// `<output>.partial` next to the final file
fn partial_path(output: &Path) -> Result<PathBuf> {
    let mut name = output
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| Error::config(format!("'{}' is not a file path", output.display())))?;
    name.push(".partial");
    Ok(output.with_file_name(name))
}

/// Transform JSON lines from `input` and write them to `path`
fn write_jsonl(
    sink: &ParquetSink,
    codec: CompressionCodec,
    input: &Path,
    path: &Path,
    batch_size: usize,
) -> Result<usize> {
    let schema = sink
        .schema()
        .map(Arc::clone)
        .ok_or_else(|| Error::config("Sink has no schema after configuration"))?;

    let file = File::open(input).map_err(|_| Error::FileNotFound {
        path: input.display().to_string(),
    })?;
    let writer_config = ParquetWriterConfig::new().with_codec(codec);
    let mut writer = ParquetWriter::new(path, schema, &writer_config)?;

    let batch_size = batch_size.max(1);
    let mut pending = Vec::with_capacity(batch_size);
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let line_no = index + 1;
        let value: JsonValue =
            serde_json::from_str(&line).with_context(|| format!("line {line_no}"))?;
        let JsonValue::Object(record) = value else {
            return Err(Error::transform(
                "<record>",
                format!("line {line_no} is not a JSON object"),
            ));
        };
        pending.push(
            sink.transform(&record)
                .with_context(|| format!("line {line_no}"))?,
        );

        if pending.len() >= batch_size {
            writer.write_records(&pending)?;
            pending.clear();
        }
    }
    writer.write_records(&pending)?;

    writer.close()
}
