//! Cachet CLI Binary
//!
//! Command-line interface for content-addressed artifact caching and change
//! detection.

use cachet::cli::{Cli, CliContext};
use cachet::logging;
use clap::Parser;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    // CLI flags override the loaded logging configuration.
    let mut logging_config = context.config().logging.clone();
    if let Some(level) = cli.log_level.clone() {
        logging_config.level = level;
    }
    if let Some(format) = cli.log_format.clone() {
        logging_config.format = format;
    }
    if let Some(output) = cli.log_output.clone() {
        logging_config.output = output;
    }
    if let Some(file) = cli.log_file.clone() {
        logging_config.file = Some(file);
    }
    if let Err(e) = logging::init_logging(Some(&logging_config)) {
        eprintln!("Error initializing logging: {e}");
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
