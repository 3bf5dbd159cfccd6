//! Freshness verdicts supplied by the serving layer.

use hotcomp_cache::RequestPath;
use thiserror::Error;

/// Whether the previously served version of a file is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Unchanged since it was last served.
    Fresh,
    /// Changed, never served, or unknown.
    Stale,
}

impl Freshness {
    /// Returns true for `Fresh`.
    pub fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// The freshness of a file could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot determine freshness of {path}: {reason}")]
pub struct FreshnessError {
    /// Path that was checked.
    pub path: RequestPath,
    /// Why the check failed.
    pub reason: String,
}

impl FreshnessError {
    /// Creates a freshness error.
    pub fn new(path: RequestPath, reason: impl Into<String>) -> Self {
        Self {
            path,
            reason: reason.into(),
        }
    }
}

/// Stale-detection policy of the serving layer.
///
/// The policy itself (modification times, content hashes, watcher events) is
/// up to the implementation. Callers treat an error as `Stale`.
pub trait FreshnessCheck {
    /// Checks whether the previously served version of `path` is still valid.
    fn check(&self, path: &RequestPath) -> Result<Freshness, FreshnessError>;
}

impl<F> FreshnessCheck for F
where
    F: Fn(&RequestPath) -> Result<Freshness, FreshnessError>,
{
    fn check(&self, path: &RequestPath) -> Result<Freshness, FreshnessError> {
        self(path)
    }
}

impl FreshnessCheck for Freshness {
    fn check(&self, _path: &RequestPath) -> Result<Freshness, FreshnessError> {
        Ok(*self)
    }
}
