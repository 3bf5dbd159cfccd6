//! Compiler-side half of the cache protocol.

use std::sync::Arc;

use hotcomp_cache::{CompiledArtifact, RequestPath};
use hotcomp_compiler::{CompileError, CompileOptions, Compiler};
use tracing::debug;

use crate::SharedCache;
use crate::inflight::{InFlight, Outcome, Ticket};
use crate::request::{SourceContent, TransformRequest};

/// Result of a successful bridge call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Served from the cache without compiling.
    Cached(Arc<CompiledArtifact>),
    /// Freshly compiled.
    Compiled(Arc<CompiledArtifact>),
    /// The cache signal arrived but the entry is gone; the caller must supply
    /// the real content again.
    Refetch,
}

impl BridgeOutcome {
    /// Returns the artifact, unless a refetch is required.
    pub fn artifact(&self) -> Option<&Arc<CompiledArtifact>> {
        match self {
            Self::Cached(artifact) | Self::Compiled(artifact) => Some(artifact),
            Self::Refetch => None,
        }
    }

    /// Returns true if the artifact came from the cache.
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

/// Records the hash of the content the bridge actually compiled.
///
/// The gate matches cached artifacts against this hash, so it must not depend
/// on how a compiler chose to fill in `source_hash`.
fn stamp(artifact: CompiledArtifact, source_hash: String) -> CompiledArtifact {
    CompiledArtifact {
        source_hash,
        ..artifact
    }
}

/// Serves cached artifacts or runs the compiler.
///
/// The bridge never looks at the filesystem. It trusts the cache signal from
/// the gate and otherwise compiles the content it is given.
pub struct CompileBridge<C: Compiler> {
    compiler: Arc<C>,
    options: CompileOptions,
    cache: SharedCache,
    inflight: Arc<InFlight>,
    enabled: bool,
}

impl<C: Compiler> CompileBridge<C> {
    pub fn new(compiler: Arc<C>, options: CompileOptions, cache: SharedCache, enabled: bool) -> Self {
        Self {
            compiler,
            options,
            cache,
            inflight: Arc::new(InFlight::new()),
            enabled,
        }
    }

    /// Returns the compiler.
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Returns the number of compilations still running.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    /// Handles one request from the gate.
    ///
    /// A failed compilation is returned as-is and never cached; it also drops
    /// any earlier artifact for the path.
    pub async fn transform(&self, request: TransformRequest) -> Result<BridgeOutcome, CompileError> {
        let TransformRequest { path, content } = request;

        let source = match content {
            SourceContent::UseCached => return Ok(self.lookup(&path)),
            SourceContent::Real(source) => source,
        };

        if !self.enabled {
            let artifact = self
                .compiler
                .compile(path.as_str(), &source, &self.options)
                .await?;
            let source_hash = CompiledArtifact::hash_source(&source);
            return Ok(BridgeOutcome::Compiled(Arc::new(stamp(artifact, source_hash))));
        }

        self.compile_shared(path, source)
            .await
            .map(BridgeOutcome::Compiled)
    }

    fn lookup(&self, path: &RequestPath) -> BridgeOutcome {
        if !self.enabled {
            return BridgeOutcome::Refetch;
        }

        match self.cache.lock().get(path) {
            Some(artifact) => {
                debug!("transform cache get {}", path);
                BridgeOutcome::Cached(artifact)
            }
            None => {
                debug!("transform cache miss on cache signal for {}, refetching", path);
                BridgeOutcome::Refetch
            }
        }
    }

    /// Compiles through the in-flight registry.
    ///
    /// The compilation runs in its own task, so it completes and updates the
    /// cache even if the request awaiting it is dropped.
    async fn compile_shared(&self, path: RequestPath, source: String) -> Outcome {
        let source_hash = CompiledArtifact::hash_source(&source);

        let (generation, sender, receiver) = match self.inflight.begin(&path, &source_hash) {
            Ticket::Join(receiver) => return InFlight::wait(receiver).await,
            Ticket::Lead {
                generation,
                sender,
                receiver,
            } => (generation, sender, receiver),
        };

        let compiler = Arc::clone(&self.compiler);
        let options = self.options.clone();
        let cache = Arc::clone(&self.cache);
        let inflight = Arc::clone(&self.inflight);

        tokio::spawn(async move {
            let outcome = compiler
                .compile(path.as_str(), &source, &options)
                .await
                .map(|artifact| Arc::new(stamp(artifact, source_hash)));

            inflight.complete(&path, generation, |current| {
                if !current {
                    debug!("Discarding superseded compilation of {}", path);
                    return;
                }
                let mut cache = cache.lock();
                match &outcome {
                    Ok(artifact) => {
                        cache.set(path.clone(), Arc::clone(artifact));
                        debug!("transform cache set {}", path);
                    }
                    Err(_) => {
                        if cache.delete(&path) {
                            debug!("transform cache del {}", path);
                        }
                    }
                }
            });

            // Nobody may be listening any more, which is fine.
            let _ = sender.send(Some(outcome));
        });

        InFlight::wait(receiver).await
    }
}
