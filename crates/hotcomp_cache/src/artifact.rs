//! Compiled artifact type.

use serde::{Deserialize, Serialize};

/// The output of compiling one source file.
///
/// Artifacts are immutable once produced. A recompilation replaces the cached
/// artifact wholesale, it never patches an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Directly executable module code.
    pub code: String,

    /// Source map, if the compiler produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,

    /// Warnings reported by the compiler.
    #[serde(default)]
    pub warnings: Vec<String>,

    /// BLAKE3 hash of the source this artifact was compiled from.
    pub source_hash: String,
}

impl CompiledArtifact {
    /// Creates an artifact for `code` compiled from `source`.
    pub fn new(code: impl Into<String>, source: &str) -> Self {
        Self {
            code: code.into(),
            map: None,
            warnings: Vec::new(),
            source_hash: Self::hash_source(source),
        }
    }

    /// Attaches a source map.
    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = Some(map.into());
        self
    }

    /// Attaches compiler warnings.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Computes the BLAKE3 hash of source content.
    pub fn hash_source(source: &str) -> String {
        blake3::hash(source.as_bytes()).to_hex().to_string()
    }

    /// Checks whether this artifact was compiled from exactly `source`.
    pub fn is_built_from(&self, source: &str) -> bool {
        self.source_hash == Self::hash_source(source)
    }
}
