//! Pathstore CLI Binary
//!
//! Command-line interface for inspecting and editing a store.

use clap::Parser;
use pathstore::logging::init_logging;
use pathstore::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut config = match CliContext::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    let context = match CliContext::new(config, cli.root.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error opening store: {}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
