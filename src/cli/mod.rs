//! CLI module
//!
//! Command-line interface for checking sink configurations and writing
//! records locally.
//!
//! # Commands
//!
//! - `validate` - Validate the sink configuration
//! - `properties` - Print the dataset properties
//! - `ddl` - Print the DDL column list
//! - `write` - Transform JSON lines into a Parquet file

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
