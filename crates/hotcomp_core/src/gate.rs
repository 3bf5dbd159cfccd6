//! Request-side half of the cache protocol.

use hotcomp_cache::{CompiledArtifact, RequestPath};
use tracing::debug;

use crate::SharedCache;
use crate::filter::RequestFilter;
use crate::freshness::Freshness;
use crate::request::{FileRequest, TransformRequest};

/// What the gate hands downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Not a compiler request; serve the content untouched.
    Passthrough(String),
    /// Send to the compile bridge.
    Forward(TransformRequest),
}

impl GateDecision {
    /// Returns the forwarded request, if any.
    pub fn into_forward(self) -> Option<TransformRequest> {
        match self {
            Self::Forward(request) => Some(request),
            Self::Passthrough(_) => None,
        }
    }
}

/// Decides per request whether the cached artifact of a file is still valid.
///
/// The gate sees the filesystem side of a request (its content and the
/// serving layer's freshness verdict) but never compiles anything. When it can
/// vouch for the cached artifact it replaces the content with the cache signal;
/// otherwise it forwards the real content and drops the outdated entry.
pub struct ModificationGate {
    cache: SharedCache,
    filter: RequestFilter,
    enabled: bool,
}

impl ModificationGate {
    pub fn new(cache: SharedCache, filter: RequestFilter, enabled: bool) -> Self {
        Self {
            cache,
            filter,
            enabled,
        }
    }

    /// Returns the filter deciding which paths are compiled.
    pub fn filter(&self) -> &RequestFilter {
        &self.filter
    }

    /// Inspects one request.
    ///
    /// The cache signal is only emitted when caching is enabled, the freshness
    /// check reports `Fresh`, and the cache holds an artifact built from the
    /// very content being served. In every other eligible case the real
    /// content is forwarded and any cached artifact for the path is deleted
    /// before this returns.
    pub fn inspect(&self, request: FileRequest<'_>) -> GateDecision {
        let FileRequest {
            path,
            content,
            is_build,
            freshness,
        } = request;

        if is_build || !self.filter.is_eligible(&path) {
            return GateDecision::Passthrough(content);
        }

        if !self.enabled {
            return GateDecision::Forward(TransformRequest::real(path, content));
        }

        let verdict = match freshness.check(&path) {
            Ok(verdict) => verdict,
            Err(e) => {
                debug!("{}, treating as stale", e);
                Freshness::Stale
            }
        };

        let mut cache = self.cache.lock();

        if verdict.is_fresh() && Self::entry_matches(cache.peek(&path).map(|a| &**a), &content)
        {
            debug!("transform cache use {}", path);
            return GateDecision::Forward(TransformRequest::use_cached(path));
        }

        if cache.delete(&path) {
            debug!("transform cache del {}", path);
        }

        GateDecision::Forward(TransformRequest::real(path, content))
    }

    /// An entry only counts if it was built from the content being served, so
    /// an artifact stored by an outdated compilation is never vouched for.
    fn entry_matches(entry: Option<&CompiledArtifact>, content: &str) -> bool {
        entry.is_some_and(|artifact| artifact.is_built_from(content))
    }

    /// Returns true if `path` would be considered by the gate at all.
    pub fn is_eligible(&self, path: &RequestPath) -> bool {
        self.filter.is_eligible(path)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use hotcomp_cache::ArtifactCache;
    use parking_lot::Mutex;

    use super::*;
    use crate::freshness::FreshnessError;
    use crate::request::SourceContent;

    fn gate_with(enabled: bool) -> (ModificationGate, SharedCache) {
        let cache: SharedCache = Arc::new(Mutex::new(ArtifactCache::new(8)));
        let filter = RequestFilter::new(&[], &[], &[".svelte".to_string()]).unwrap();
        (
            ModificationGate::new(Arc::clone(&cache), filter, enabled),
            cache,
        )
    }

    fn seed(cache: &SharedCache, path: &str, content: &str) {
        cache
            .lock()
            .set(path.into(), CompiledArtifact::new("compiled", content));
    }

    fn forwarded(decision: GateDecision) -> TransformRequest {
        decision.into_forward().expect("expected a forwarded request")
    }

    #[test]
    fn test_ineligible_path_passes_through() {
        let (gate, cache) = gate_with(true);
        seed(&cache, "/main.js", "js");

        let decision = gate.inspect(FileRequest::new("/main.js", "js", &Freshness::Fresh));

        assert_eq!(decision, GateDecision::Passthrough("js".to_string()));
        assert!(cache.lock().contains(&"/main.js".into()));
    }

    #[test]
    fn test_build_request_passes_through() {
        let (gate, cache) = gate_with(true);
        seed(&cache, "/App.svelte", "src");

        let decision =
            gate.inspect(FileRequest::new("/App.svelte", "src", &Freshness::Fresh).for_build());

        assert_eq!(decision, GateDecision::Passthrough("src".to_string()));
    }

    #[test]
    fn test_fresh_with_entry_emits_sentinel() {
        let (gate, cache) = gate_with(true);
        seed(&cache, "/App.svelte", "src");

        let request = forwarded(gate.inspect(FileRequest::new(
            "/App.svelte",
            "src",
            &Freshness::Fresh,
        )));

        assert_eq!(request.content, SourceContent::UseCached);
        assert!(cache.lock().contains(&"/App.svelte".into()));
    }

    #[test]
    fn test_fresh_without_entry_forwards_real_content() {
        let (gate, _cache) = gate_with(true);

        let request = forwarded(gate.inspect(FileRequest::new(
            "/App.svelte",
            "src",
            &Freshness::Fresh,
        )));

        assert_eq!(request.content, SourceContent::Real("src".to_string()));
    }

    #[test]
    fn test_stale_deletes_entry_and_forwards_real_content() {
        let (gate, cache) = gate_with(true);
        seed(&cache, "/App.svelte", "old");

        let request = forwarded(gate.inspect(FileRequest::new(
            "/App.svelte",
            "new",
            &Freshness::Stale,
        )));

        assert_eq!(request.content, SourceContent::Real("new".to_string()));
        assert!(!cache.lock().contains(&"/App.svelte".into()));
    }

    #[test]
    fn test_freshness_failure_is_treated_as_stale() {
        let (gate, cache) = gate_with(true);
        seed(&cache, "/App.svelte", "src");
        let failing = |path: &RequestPath| -> Result<Freshness, FreshnessError> {
            Err(FreshnessError::new(path.clone(), "file vanished"))
        };

        let request = forwarded(gate.inspect(FileRequest::new("/App.svelte", "src", &failing)));

        assert!(!request.is_cache_hit());
        assert!(cache.lock().is_empty());
    }

    #[test]
    fn test_fresh_verdict_with_mismatching_entry_is_not_trusted() {
        let (gate, cache) = gate_with(true);
        seed(&cache, "/App.svelte", "old");

        let request = forwarded(gate.inspect(FileRequest::new(
            "/App.svelte",
            "new",
            &Freshness::Fresh,
        )));

        assert_eq!(request.content, SourceContent::Real("new".to_string()));
        assert!(cache.lock().is_empty());
    }

    #[test]
    fn test_disabled_gate_never_consults_freshness_or_cache() {
        let (gate, cache) = gate_with(false);
        seed(&cache, "/App.svelte", "src");
        let calls = Cell::new(0);
        let counting = |_: &RequestPath| -> Result<Freshness, FreshnessError> {
            calls.set(calls.get() + 1);
            Ok(Freshness::Fresh)
        };

        let request = forwarded(gate.inspect(FileRequest::new("/App.svelte", "src", &counting)));

        assert_eq!(request.content, SourceContent::Real("src".to_string()));
        assert_eq!(calls.get(), 0);
        assert!(cache.lock().contains(&"/App.svelte".into()));
    }

    #[test]
    fn test_is_eligible_delegates_to_filter() {
        let (gate, _) = gate_with(true);
        assert!(gate.is_eligible(&"/App.svelte".into()));
        assert!(!gate.is_eligible(&"/App.vue".into()));
        assert_eq!(gate.filter().extensions(), &[".svelte".to_string()]);
    }
}
