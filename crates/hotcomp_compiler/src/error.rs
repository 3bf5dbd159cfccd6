//! Compile error types.

use thiserror::Error;

/// Errors that can occur during compilation.
///
/// The type is `Clone` so that one failed compilation can be reported to every
/// request that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The source text is invalid.
    #[error("Syntax error in {path} at {line}:{column}: {message}")]
    Syntax {
        /// Request path of the file.
        path: String,
        /// Error message.
        message: String,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },

    /// The compiler ran but reported a failure.
    #[error("Failed to compile {path}: {message}")]
    Failed {
        /// Request path of the file.
        path: String,
        /// Error message.
        message: String,
    },

    /// The compiler could not be started.
    #[error("Failed to start compiler: {0}")]
    Spawn(String),

    /// An internal error occurred.
    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl CompileError {
    /// Creates a syntax error.
    pub fn syntax(
        path: impl Into<String>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Creates a compilation failure.
    pub fn failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the path of the file that failed, if known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Syntax { path, .. } | Self::Failed { path, .. } => Some(path),
            Self::Spawn(_) | Self::Internal(_) => None,
        }
    }
}
