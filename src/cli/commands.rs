//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parquet fileset sink CLI
#[derive(Parser, Debug)]
#[command(name = "fileset-sink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Sink configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Macro value for late-bound config fields (key=value, repeatable)
    #[arg(short = 'D', long = "macro", global = true)]
    pub macros: Vec<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the sink configuration
    Validate,

    /// Print the dataset properties as JSON
    Properties {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the DDL column list
    Ddl {
        /// Wrap the column list in parentheses
        #[arg(long)]
        delimited: bool,
    },

    /// Transform JSON lines and write them to a Parquet file
    Write {
        /// Input file with one JSON record per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output Parquet file
        #[arg(short, long)]
        output: PathBuf,

        /// Records per row batch
        #[arg(long, default_value = "10000")]
        batch_size: usize,
    },
}
