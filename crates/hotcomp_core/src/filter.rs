use globset::{Glob, GlobSet, GlobSetBuilder};
use hotcomp_cache::RequestPath;

use crate::error::PipelineError;

/// Decides which request paths the compiler handles.
#[derive(Debug, Clone)]
pub struct RequestFilter {
    include_globs: Option<GlobSet>,
    exclude_globs: Option<GlobSet>,
    extensions: Vec<String>,
}

impl RequestFilter {
    pub fn new(
        include: &[String],
        exclude: &[String],
        extensions: &[String],
    ) -> Result<Self, PipelineError> {
        let include_globs = Self::build_globset(include)?;
        let exclude_globs = Self::build_globset(exclude)?;

        Ok(Self {
            include_globs,
            exclude_globs,
            extensions: extensions.iter().map(|ext| Self::with_dot(ext)).collect(),
        })
    }

    fn with_dot(ext: &str) -> String {
        if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        }
    }

    fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, PipelineError> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern.trim_start_matches('/'))
                .map_err(|e| PipelineError::config(format!("Invalid glob pattern: {}", e)))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| PipelineError::config(format!("Failed to build globset: {}", e)))?;

        Ok(Some(globset))
    }

    /// Checks if a request path should be compiled.
    ///
    /// Patterns are matched against the path without its leading `/`.
    pub fn is_eligible(&self, path: &RequestPath) -> bool {
        let relative = path.relative();

        if self
            .exclude_globs
            .as_ref()
            .is_some_and(|excludes| excludes.is_match(relative))
        {
            return false;
        }

        if self
            .include_globs
            .as_ref()
            .is_some_and(|includes| !includes.is_match(relative))
        {
            return false;
        }

        self.extensions.iter().any(|ext| path.has_extension(ext))
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}
