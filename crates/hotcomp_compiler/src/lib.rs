//! # hotcomp_compiler
//!
//! Compiler abstraction layer for hotcomp.
//!
//! This crate provides:
//! - A `Compiler` trait that turns author-facing source into executable module code
//! - `CompileOptions` forwarded to the compiler on every call
//! - `ProcessCompiler`, which delegates to an external command
//!
//! ## Architecture
//!
//! Compilers are pure content-in/content-out transforms. They never look at
//! the filesystem and know nothing about caching; deciding whether a file
//! needs compiling at all is the job of `hotcomp_core`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hotcomp_compiler::{CompileOptions, Compiler, ProcessCompiler};
//!
//! let compiler = ProcessCompiler::from_command_line("svelte-compile --esm")?;
//! let artifact = compiler
//!     .compile("/src/App.svelte", "<h1>hi</h1>", &CompileOptions::default())
//!     .await?;
//! ```

mod error;
mod options;
mod process;
mod traits;

pub use error::CompileError;
pub use hotcomp_cache::CompiledArtifact;
pub use options::CompileOptions;
pub use process::ProcessCompiler;
pub use traits::Compiler;
