//! restdoc-from-source - Command-line tool for documenting captured HTTP traffic.
//!
//! # Usage
//!
//! ```bash
//! restdoc-from-source [OPTIONS] --captures <FILE> <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Render AsciiDoc to a file:
//! ```bash
//! restdoc-from-source ./my-service -c target/captures.yaml -o docs/api.adoc
//! ```
//!
//! Dump the documented tree as JSON, treating `Uuid` as a string:
//! ```bash
//! restdoc-from-source ./my-service -c captures.yaml -f json --string-type Uuid
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use restdoc_from_source::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("restdoc-from-source starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
