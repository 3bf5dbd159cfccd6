//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// hotcomp - Incremental compile cache for dev servers
#[derive(Parser)]
#[command(name = "hotcomp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable the transform cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve files through the dev pipeline
    Transform {
        /// Request paths of the files, relative to the root
        #[arg(required = true)]
        files: Vec<String>,

        /// Compiler command, run once per compilation with the source on stdin
        #[arg(long, default_value = "cat")]
        compiler: String,

        /// How many times each file is requested
        #[arg(long, default_value_t = 2)]
        repeat: usize,

        /// Directory the request paths are resolved against
        #[arg(long)]
        root: Option<PathBuf>,

        /// Write compiled artifacts to this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
