//! Parquet fileset sink

use crate::config::{RawSinkConfig, SinkConfig};
use crate::error::{Error, Result};
use crate::schema::{self, Schema};
use crate::sink::configurator::assemble_properties;
use crate::sink::properties::PropertyBag;
use crate::template::MacroContext;
use crate::transform::{GenericRecord, RecordTransformer};
use crate::types::InputRecord;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Capabilities a batch sink exposes to the execution framework
pub trait BatchSink {
    /// Record type emitted to the write path
    type Output;

    /// Validate the config and build the dataset properties
    fn configure(&mut self) -> Result<PropertyBag>;

    /// Prepare for per-record transforms
    fn initialize(&mut self) -> Result<()>;

    /// Convert one input record
    fn transform(&self, record: &InputRecord) -> Result<Self::Output>;
}

/// Sink lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SinkState {
    /// Config not yet validated
    Unconfigured,
    /// Schema parsed
    Validated,
    /// Dataset properties assembled
    Configured,
    /// Accepting records
    Active,
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkState::Unconfigured => "unconfigured",
            SinkState::Validated => "validated",
            SinkState::Configured => "configured",
            SinkState::Active => "active",
        };
        f.write_str(name)
    }
}

/// Sink that writes records as a Parquet fileset
#[derive(Debug)]
pub struct ParquetSink {
    config: SinkConfig,
    state: SinkState,
    schema: Option<Arc<Schema>>,
    properties: Option<PropertyBag>,
    transformer: Option<RecordTransformer>,
}

impl ParquetSink {
    /// Create an unconfigured sink
    pub fn new(config: SinkConfig) -> Self {
        Self {
            config,
            state: SinkState::Unconfigured,
            schema: None,
            properties: None,
            transformer: None,
        }
    }

    /// Resolve macros in a raw config and create the sink
    pub fn from_raw(raw: &RawSinkConfig, ctx: &MacroContext) -> Result<Self> {
        Ok(Self::new(raw.resolve(ctx)?))
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Validated schema, once the sink is past `Unconfigured`
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    /// Dataset properties, once configured
    pub fn properties(&self) -> Option<&PropertyBag> {
        self.properties.as_ref()
    }

    /// Parse the schema, moving `Unconfigured` to `Validated`
    pub fn validate(&mut self) -> Result<Arc<Schema>> {
        if let Some(schema) = &self.schema {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(schema::validate(&self.config.schema)?);
        self.schema = Some(Arc::clone(&schema));
        self.state = SinkState::Validated;
        debug!(dataset = %self.config.name, "Schema validated");
        Ok(schema)
    }
}

impl BatchSink for ParquetSink {
    type Output = GenericRecord;

    fn configure(&mut self) -> Result<PropertyBag> {
        if let Some(properties) = &self.properties {
            return Ok(properties.clone());
        }

        let schema = self.validate()?;
        let properties = assemble_properties(&self.config, &schema)?;
        self.properties = Some(properties.clone());
        self.state = SinkState::Configured;

        info!(
            dataset = %self.config.name,
            properties = properties.len(),
            "Sink configured"
        );
        Ok(properties)
    }

    fn initialize(&mut self) -> Result<()> {
        match self.state {
            SinkState::Active => return Ok(()),
            SinkState::Configured => {}
            state => return Err(Error::invalid_state(state, SinkState::Configured)),
        }

        let schema = self
            .schema
            .clone()
            .ok_or_else(|| Error::invalid_state(self.state, SinkState::Validated))?;
        self.transformer = Some(RecordTransformer::new(schema));
        self.state = SinkState::Active;

        info!(dataset = %self.config.name, "Sink initialized");
        Ok(())
    }

    fn transform(&self, record: &InputRecord) -> Result<GenericRecord> {
        let transformer = self
            .transformer
            .as_ref()
            .ok_or_else(|| Error::invalid_state(self.state, SinkState::Active))?;

        transformer.transform(record).inspect_err(|e| {
            debug!(dataset = %self.config.name, error = %e, "Record transform failed");
        })
    }
}
