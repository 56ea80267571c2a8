//! Fileset sink CLI
//!
//! Command-line interface for sink configurations

use clap::Parser;
use fileset_sink::cli::{Cli, Runner};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run() {
        // Config problems exit 2
        if e.is_config_time() {
            eprintln!("Invalid sink configuration: {e}");
            std::process::exit(2);
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
