//! Request types passed between the serving layer, the gate and the bridge.

use std::fmt;

use hotcomp_cache::RequestPath;

use crate::freshness::FreshnessCheck;

/// Content handed from the gate to the bridge.
///
/// `UseCached` is the "serve from cache" signal. Being its own variant, it can
/// never be confused with real source text, whatever that text contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    /// The file's actual content.
    Real(String),
    /// The gate vouches that the file is unchanged since its cached artifact was built.
    UseCached,
}

impl SourceContent {
    /// Returns true if this is the cache signal rather than real content.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::UseCached)
    }

    /// Returns the real content, if any.
    pub fn as_real(&self) -> Option<&str> {
        match self {
            Self::Real(content) => Some(content),
            Self::UseCached => None,
        }
    }
}

/// Request context forwarded from the gate to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    /// Path of the requested file.
    pub path: RequestPath,
    /// Real content, or the cache signal.
    pub content: SourceContent,
}

impl TransformRequest {
    /// Creates a request carrying real content.
    pub fn real(path: RequestPath, content: impl Into<String>) -> Self {
        Self {
            path,
            content: SourceContent::Real(content.into()),
        }
    }

    /// Creates a request carrying the cache signal.
    pub fn use_cached(path: RequestPath) -> Self {
        Self {
            path,
            content: SourceContent::UseCached,
        }
    }

    /// Returns true if this request asks to be served from cache.
    pub fn is_cache_hit(&self) -> bool {
        self.content.is_sentinel()
    }
}

/// A file request as it arrives from the serving layer.
pub struct FileRequest<'a> {
    /// Path of the requested file.
    pub path: RequestPath,
    /// The file's content as just read.
    pub content: String,
    /// True when serving a production build rather than the dev server.
    pub is_build: bool,
    /// Decides whether the previously served version is still valid.
    pub freshness: &'a dyn FreshnessCheck,
}

impl<'a> FileRequest<'a> {
    /// Creates a dev-server request.
    pub fn new(
        path: impl Into<RequestPath>,
        content: impl Into<String>,
        freshness: &'a dyn FreshnessCheck,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            is_build: false,
            freshness,
        }
    }

    /// Marks the request as part of a production build.
    pub fn for_build(mut self) -> Self {
        self.is_build = true;
        self
    }
}

impl fmt::Debug for FileRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRequest")
            .field("path", &self.path)
            .field("content_len", &self.content.len())
            .field("is_build", &self.is_build)
            .field("freshness", &"<dyn FreshnessCheck>")
            .finish()
    }
}
