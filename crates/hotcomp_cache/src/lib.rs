//! # hotcomp_cache
//!
//! In-memory artifact cache for hotcomp.
//!
//! This crate stores the output of the last successful compilation of every
//! served source file so that an unchanged file can be served again without
//! running the compiler.
//!
//! ## Cache Strategy
//!
//! 1. **Path-keyed**: one entry per request path, replaced wholesale on recompilation
//! 2. **Bounded**: a fixed entry count with least-recently-used eviction
//! 3. **Process-scoped**: nothing is persisted, the cache lives as long as its owner
//!
//! Invalidation is explicit: callers `delete` entries they know to be stale.
//! There is no time-based expiry.

mod artifact;
mod lru;
mod path;

pub use artifact::CompiledArtifact;
pub use lru::{ArtifactCache, CacheStats, DEFAULT_CAPACITY};
pub use path::RequestPath;
