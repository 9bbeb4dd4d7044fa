//! Critters - camera trap detection and activity CLI tool.
//!
//! This crate merges timestamped camera trap images into detections and
//! aggregates detections into hour-of-day and month-of-year activity per
//! station, per group of stations, and overall.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod critters;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod utils;

use clap::Parser;
use cli::{Cli, Command, ConfigAction};
use config::{Config, config_file_path, load_config, load_config_file, save_config};
use std::path::Path;
use tracing::info;

pub use error::{Error, Result};

/// Main entry point for critters CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    handle_command(cli.command, cli.config.as_deref())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action, config_path),
        Command::Detections(args) => {
            let config = load_config(config_path)?;
            pipeline::execute_detections(&args, &config)?;
            Ok(())
        }
        Command::Diel(args) => {
            let config = load_config(config_path)?;
            pipeline::execute_diel(&args, &config)?;
            Ok(())
        }
        Command::Monthly(args) => {
            let config = load_config(config_path)?;
            pipeline::execute_monthly(&args, &config)?;
            Ok(())
        }
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };

    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), &path)?;
                info!("Created default configuration");
                println!("Created configuration file: {}", path.display());
                println!("\nAdd station groups under [groups], e.g.");
                println!("  north = [\"HOLA1\", \"HOLA2\"]");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config_file(&path)?;
            let contents =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("# {}", display_path(&path));
            println!("{contents}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn display_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, showing defaults)", path.display())
    }
}
