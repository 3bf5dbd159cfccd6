//! Filesystem-backed freshness tracking.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use hotcomp_cache::RequestPath;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::PipelineError;
use crate::freshness::{Freshness, FreshnessCheck, FreshnessError};

/// Maximum size of a file served through the pipeline.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

impl Stamp {
    fn of(metadata: &fs::Metadata) -> std::io::Result<Self> {
        Ok(Self {
            modified: metadata.modified()?,
            len: metadata.len(),
        })
    }
}

/// Remembers the modification time and size of every file at the moment the
/// server last read it.
///
/// A file is `Fresh` while its current metadata matches the recorded stamp.
#[derive(Debug)]
pub struct FileStamps {
    root: PathBuf,
    stamps: Mutex<HashMap<RequestPath, Stamp>>,
}

impl FileStamps {
    /// Creates a tracker serving files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            stamps: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the served root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path to the file on disk.
    pub fn resolve(&self, path: &RequestPath) -> Result<PathBuf, PipelineError> {
        let relative = Path::new(path.relative());
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(PipelineError::file(format!(
                "Request path escapes the served root: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Reads a file and reports whether it is unchanged since the previous read.
    ///
    /// The stamp is taken before the content is read, so a write racing this
    /// read leaves an outdated stamp behind and the next read reports `Stale`.
    pub fn read(&self, path: &RequestPath) -> Result<(String, Freshness), PipelineError> {
        let file = self.resolve(path)?;

        let metadata = fs::metadata(&file).map_err(|e| {
            PipelineError::file(format!(
                "Failed to read metadata for {}: {}",
                file.display(),
                e
            ))
        })?;

        if !metadata.is_file() {
            return Err(PipelineError::file(format!(
                "Not a regular file: {}",
                file.display()
            )));
        }

        if metadata.len() > MAX_FILE_SIZE {
            return Err(PipelineError::file(format!(
                "File size exceeds limit of {} bytes: {}",
                MAX_FILE_SIZE,
                file.display()
            )));
        }

        let stamp = Stamp::of(&metadata)?;
        let content = fs::read_to_string(&file)
            .map_err(|e| PipelineError::file(format!("Failed to read {}: {}", file.display(), e)))?;

        let previous = self.stamps.lock().insert(path.clone(), stamp);
        let freshness = if previous == Some(stamp) {
            Freshness::Fresh
        } else {
            Freshness::Stale
        };

        debug!("Read {} ({:?})", path, freshness);
        Ok((content, freshness))
    }

    /// Forgets the recorded stamp, so the next read reports `Stale`.
    pub fn forget(&self, path: &RequestPath) {
        self.stamps.lock().remove(path);
    }

    /// Returns the number of tracked files.
    pub fn len(&self) -> usize {
        self.stamps.lock().len()
    }

    /// Returns true if no file has been read yet.
    pub fn is_empty(&self) -> bool {
        self.stamps.lock().is_empty()
    }
}

impl FreshnessCheck for FileStamps {
    fn check(&self, path: &RequestPath) -> Result<Freshness, FreshnessError> {
        let file = self
            .resolve(path)
            .map_err(|e| FreshnessError::new(path.clone(), e.to_string()))?;
        let metadata =
            fs::metadata(&file).map_err(|e| FreshnessError::new(path.clone(), e.to_string()))?;
        let current =
            Stamp::of(&metadata).map_err(|e| FreshnessError::new(path.clone(), e.to_string()))?;

        match self.stamps.lock().get(path) {
            Some(recorded) if *recorded == current => Ok(Freshness::Fresh),
            _ => Ok(Freshness::Stale),
        }
    }
}
