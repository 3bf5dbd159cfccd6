//! Bounded artifact cache with least-recently-used eviction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::{CompiledArtifact, RequestPath};

/// Default number of entries, sized for the file count of a typical project.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Counters describing cache activity since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Calls to `set`, including overwrites.
    pub inserts: u64,
    /// Entries removed to make room for new ones.
    pub evictions: u64,
    /// Entries removed by explicit `delete` calls.
    pub deletions: u64,
}

#[derive(Debug)]
struct CacheEntry {
    artifact: Arc<CompiledArtifact>,
    /// Access tick, also the entry's key in the recency index.
    last_access: u64,
}

/// Stores the latest compiled artifact for each request path.
///
/// Artifacts are handed out as `Arc`s, so an entry evicted while a request is
/// still using it stays alive until that request drops it.
#[derive(Debug)]
pub struct ArtifactCache {
    entries: HashMap<RequestPath, CacheEntry>,
    /// Access tick -> path, oldest first.
    recency: BTreeMap<u64, RequestPath>,
    capacity: usize,
    tick: u64,
    stats: CacheStats,
}

impl ArtifactCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            recency: BTreeMap::new(),
            capacity,
            tick: 0,
            stats: CacheStats::default(),
        }
    }

    /// Returns the artifact for `path` and marks it most recently used.
    pub fn get(&mut self, path: &RequestPath) -> Option<Arc<CompiledArtifact>> {
        self.tick += 1;
        let tick = self.tick;

        match self.entries.get_mut(path) {
            Some(entry) => {
                self.recency.remove(&entry.last_access);
                entry.last_access = tick;
                self.recency.insert(tick, path.clone());
                self.stats.hits += 1;
                Some(Arc::clone(&entry.artifact))
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Returns the artifact for `path` without touching its recency.
    pub fn peek(&self, path: &RequestPath) -> Option<&Arc<CompiledArtifact>> {
        self.entries.get(path).map(|entry| &entry.artifact)
    }

    /// Checks if an entry exists without updating its recency.
    pub fn contains(&self, path: &RequestPath) -> bool {
        self.entries.contains_key(path)
    }

    /// Stores an artifact for `path`, replacing any previous one, and marks it
    /// most recently used.
    ///
    /// Inserting a new path into a full cache evicts the least recently used
    /// entry first. Returns the replaced artifact, if any.
    pub fn set(
        &mut self,
        path: RequestPath,
        artifact: impl Into<Arc<CompiledArtifact>>,
    ) -> Option<Arc<CompiledArtifact>> {
        self.tick += 1;
        let tick = self.tick;
        let artifact = artifact.into();
        self.stats.inserts += 1;

        if let Some(entry) = self.entries.get_mut(&path) {
            self.recency.remove(&entry.last_access);
            entry.last_access = tick;
            self.recency.insert(tick, path);
            return Some(std::mem::replace(&mut entry.artifact, artifact));
        }

        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.recency.insert(tick, path.clone());
        self.entries.insert(
            path,
            CacheEntry {
                artifact,
                last_access: tick,
            },
        );

        None
    }

    /// Removes the entry for `path`. Removing an absent path is a no-op.
    ///
    /// Returns true if an entry was removed.
    pub fn delete(&mut self, path: &RequestPath) -> bool {
        match self.entries.remove(path) {
            Some(entry) => {
                self.recency.remove(&entry.last_access);
                self.stats.deletions += 1;
                true
            }
            None => false,
        }
    }

    fn evict_lru(&mut self) {
        if let Some((_, path)) = self.recency.pop_first() {
            self.entries.remove(&path);
            self.stats.evictions += 1;
            debug!("transform cache evict {}", path);
        }
    }

    /// Clears all cache entries. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Returns the cached paths ordered from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<RequestPath> {
        self.recency.values().cloned().collect()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns activity counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
