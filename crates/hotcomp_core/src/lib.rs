//! # hotcomp_core
//!
//! Incremental compile cache for a dev server.
//!
//! This crate provides:
//! - The `DevPipeline` orchestrator
//! - The modification gate and compile bridge cooperating over one artifact cache
//! - Configuration loading
//! - Request filtering and file freshness tracking
//!
//! ## Example
//!
//! ```rust,ignore
//! use hotcomp_core::{DevConfig, DevPipeline, FileStamps};
//! use hotcomp_compiler::ProcessCompiler;
//!
//! let config = DevConfig::from_file("hotcomp.json")?;
//! let pipeline = DevPipeline::new(&config, ProcessCompiler::from_command_line("svelte-compile")?)?;
//! let stamps = FileStamps::new("./public");
//!
//! let served = pipeline.serve_file(&stamps, &"/App.svelte".into(), false).await?;
//! println!("cache hit: {}", served.is_cache_hit());
//! ```

use std::sync::Arc;

mod bridge;
mod config;
mod error;
mod filter;
mod freshness;
mod gate;
mod inflight;
mod pipeline;
mod request;
mod stamps;

pub use bridge::{BridgeOutcome, CompileBridge};
pub use config::{DevConfig, LogLevel};
pub use error::PipelineError;
pub use filter::RequestFilter;
pub use freshness::{Freshness, FreshnessCheck, FreshnessError};
pub use gate::{GateDecision, ModificationGate};
pub use pipeline::{DevPipeline, Served};
pub use request::{FileRequest, SourceContent, TransformRequest};
pub use stamps::{FileStamps, MAX_FILE_SIZE};

pub use hotcomp_cache::{ArtifactCache, CacheStats, CompiledArtifact, RequestPath};
pub use hotcomp_compiler::{CompileError, CompileOptions, Compiler};

/// Artifact cache shared by the gate and the bridge of one pipeline.
pub type SharedCache = Arc<parking_lot::Mutex<ArtifactCache>>;
