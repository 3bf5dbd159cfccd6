//! hotcomp CLI
//!
//! Drives the incremental compile pipeline over files on disk.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use hotcomp_core::DevConfig;
use miette::{IntoDiagnostic, Result};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::transform::{TransformArgs, run_transform};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(&cli);

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        match &config {
            Ok(config) => EnvFilter::new(config.log_level.as_filter()),
            Err(_) => EnvFilter::new("info"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match config.and_then(|config| run(&cli, &config)) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn load_config(cli: &Cli) -> Result<DevConfig> {
    let mut config = if let Some(ref path) = cli.config {
        DevConfig::from_file(path).into_diagnostic()?
    } else {
        let cwd = std::env::current_dir().into_diagnostic()?;
        DevConfig::discover(&cwd).into_diagnostic()?.unwrap_or_default()
    };

    if cli.no_cache {
        config.use_transform_cache = false;
    }

    Ok(config)
}

fn run(cli: &Cli, config: &DevConfig) -> Result<bool> {
    match &cli.command {
        Commands::Transform {
            files,
            compiler,
            repeat,
            root,
            out_dir,
            format,
        } => {
            if *repeat == 0 {
                warn!("--repeat 0 serves nothing");
            }
            run_transform(
                config,
                TransformArgs {
                    files,
                    compiler,
                    repeat: *repeat,
                    root: root.as_deref(),
                    out_dir: out_dir.as_deref(),
                    format: *format,
                },
            )
        }
    }
}
