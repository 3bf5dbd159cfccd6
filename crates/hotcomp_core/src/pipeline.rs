//! Dev pipeline wiring the gate and the bridge around one cache.

use std::sync::Arc;

use hotcomp_cache::{ArtifactCache, CacheStats, CompiledArtifact, RequestPath};
use hotcomp_compiler::Compiler;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bridge::{BridgeOutcome, CompileBridge};
use crate::config::DevConfig;
use crate::error::PipelineError;
use crate::filter::RequestFilter;
use crate::gate::{GateDecision, ModificationGate};
use crate::request::{FileRequest, TransformRequest};
use crate::stamps::FileStamps;
use crate::SharedCache;

/// What the dev server sends back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Served {
    /// Not handled by the compiler.
    Passthrough(String),
    /// Compiled output, either fresh or from the cache.
    Artifact {
        artifact: Arc<CompiledArtifact>,
        cache_hit: bool,
    },
}

impl Served {
    /// Returns the code to send to the client.
    pub fn code(&self) -> &str {
        match self {
            Self::Passthrough(content) => content,
            Self::Artifact { artifact, .. } => &artifact.code,
        }
    }

    /// Returns the compiled artifact, if the compiler handled the request.
    pub fn artifact(&self) -> Option<&Arc<CompiledArtifact>> {
        match self {
            Self::Artifact { artifact, .. } => Some(artifact),
            Self::Passthrough(_) => None,
        }
    }

    /// Returns true if the artifact was served without compiling.
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::Artifact { cache_hit: true, .. })
    }
}

/// Incremental compile pipeline for a dev server.
///
/// One pipeline owns one artifact cache. Each request goes through the
/// modification gate first and then, if eligible, through the compile bridge.
pub struct DevPipeline<C: Compiler> {
    gate: ModificationGate,
    bridge: CompileBridge<C>,
    cache: SharedCache,
    config_hash: String,
}

impl<C: Compiler> DevPipeline<C> {
    /// Creates a new pipeline with the given configuration.
    pub fn new(config: &DevConfig, compiler: C) -> Result<Self, PipelineError> {
        let cache: SharedCache = Arc::new(Mutex::new(ArtifactCache::new(config.cache_capacity)));
        let filter = RequestFilter::new(&config.include, &config.exclude, &config.extensions)?;
        let enabled = config.use_transform_cache;

        let gate = ModificationGate::new(Arc::clone(&cache), filter, enabled);
        let bridge = CompileBridge::new(
            Arc::new(compiler),
            config.compiler.clone(),
            Arc::clone(&cache),
            enabled,
        );

        let config_hash = config.hash();
        info!(
            "Dev pipeline ready (compiler: {}, transform cache: {}, capacity: {}, config: {})",
            bridge.compiler().name(),
            if enabled { "on" } else { "off" },
            config.cache_capacity,
            &config_hash[..12]
        );

        Ok(Self {
            gate,
            bridge,
            cache,
            config_hash,
        })
    }

    /// Handles one request.
    ///
    /// `refetch` is called at most once, when the gate vouched for a cached
    /// artifact that was evicted before the bridge could serve it. It must
    /// return the file's current content, which is then compiled.
    pub async fn handle<F>(&self, request: FileRequest<'_>, refetch: F) -> Result<Served, PipelineError>
    where
        F: FnOnce() -> Result<String, PipelineError>,
    {
        let forwarded = match self.gate.inspect(request) {
            GateDecision::Passthrough(content) => return Ok(Served::Passthrough(content)),
            GateDecision::Forward(forwarded) => forwarded,
        };

        self.forward(forwarded, refetch).await
    }

    async fn forward<F>(&self, request: TransformRequest, refetch: F) -> Result<Served, PipelineError>
    where
        F: FnOnce() -> Result<String, PipelineError>,
    {
        let path = request.path.clone();

        match self.bridge.transform(request).await? {
            BridgeOutcome::Refetch => {
                debug!("Refetching {} after losing its cached artifact", path);
                let content = refetch()?;
                let outcome = self
                    .bridge
                    .transform(TransformRequest::real(path, content))
                    .await?;
                Self::served(outcome)
            }
            outcome => Self::served(outcome),
        }
    }

    fn served(outcome: BridgeOutcome) -> Result<Served, PipelineError> {
        match outcome {
            BridgeOutcome::Cached(artifact) => Ok(Served::Artifact {
                artifact,
                cache_hit: true,
            }),
            BridgeOutcome::Compiled(artifact) => Ok(Served::Artifact {
                artifact,
                cache_hit: false,
            }),
            BridgeOutcome::Refetch => Err(PipelineError::Internal(
                "Bridge requested a refetch for real content".to_string(),
            )),
        }
    }

    /// Reads `path` below the stamps' root and serves it.
    pub async fn serve_file(
        &self,
        stamps: &FileStamps,
        path: &RequestPath,
        is_build: bool,
    ) -> Result<Served, PipelineError> {
        let (content, freshness) = stamps.read(path)?;

        let mut request = FileRequest::new(path.clone(), content, &freshness);
        if is_build {
            request = request.for_build();
        }

        self.handle(request, || stamps.read(path).map(|(content, _)| content))
            .await
    }

    /// Returns the modification gate.
    pub fn gate(&self) -> &ModificationGate {
        &self.gate
    }

    /// Returns the compiler.
    pub fn compiler(&self) -> &C {
        self.bridge.compiler()
    }

    /// Returns the number of cached artifacts.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    /// Drops every cached artifact.
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        info!("Transform cache cleared");
    }

    /// Returns the hash of the configuration the pipeline was built from.
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }
}
