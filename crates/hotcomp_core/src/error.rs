//! Pipeline error types.

use hotcomp_compiler::CompileError;
use thiserror::Error;

/// Errors that can occur while serving a file through the pipeline.
///
/// Every error is scoped to the request it occurred in. Only `Compile` is
/// meant to be shown to the end user of a dev server.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File error.
    #[error("File error: {0}")]
    File(String),

    /// The compiler rejected the source.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a file error.
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    /// Returns true if this error should be reported to the end user.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Compile(_))
    }
}
