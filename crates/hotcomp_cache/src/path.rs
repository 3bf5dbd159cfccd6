//! Request path type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A source file as the serving layer sees it, e.g. `/src/App.svelte`.
///
/// Paths are normalized on construction: backslashes become `/`, a leading
/// `./` is dropped and a leading `/` is ensured. Two requests for the same
/// file therefore always map to the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestPath(String);

impl RequestPath {
    /// Creates a normalized request path.
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut normalized = path.as_ref().replace('\\', "/");

        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }

        if !normalized.starts_with('/') {
            normalized.insert(0, '/');
        }

        Self(normalized)
    }

    /// Returns the normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path without its leading `/`, suitable for joining onto a root directory
    /// or matching against relative glob patterns.
    pub fn relative(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Returns true if the path ends with the given extension (e.g. `.svelte`).
    pub fn has_extension(&self, extension: &str) -> bool {
        self.0.ends_with(extension)
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for RequestPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for RequestPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
