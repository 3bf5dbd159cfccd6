//! Registry of compilations that are still running.
//!
//! Concurrent requests for the same path and the same content share one
//! compilation instead of each starting their own. A request for the same path
//! with different content supersedes the running compilation: the older one
//! still finishes and answers its own waiters, but it no longer owns the slot
//! and therefore must not write to the cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hotcomp_cache::{CompiledArtifact, RequestPath};
use hotcomp_compiler::CompileError;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

/// Result shared by every request waiting on one compilation.
pub type Outcome = Result<Arc<CompiledArtifact>, CompileError>;

struct Slot {
    generation: u64,
    source_hash: String,
    receiver: watch::Receiver<Option<Outcome>>,
}

impl Slot {
    /// True if the compiling task went away without reporting.
    fn is_abandoned(&self) -> bool {
        self.receiver.has_changed().is_err() && self.receiver.borrow().is_none()
    }
}

/// What a caller should do after registering interest in a compilation.
pub enum Ticket {
    /// Someone is already compiling this content; wait for their result.
    Join(watch::Receiver<Option<Outcome>>),
    /// The caller must run the compilation and report through `sender`.
    Lead {
        generation: u64,
        sender: watch::Sender<Option<Outcome>>,
        receiver: watch::Receiver<Option<Outcome>>,
    },
}

#[derive(Default)]
pub struct InFlight {
    slots: Mutex<HashMap<RequestPath, Slot>>,
    next_generation: AtomicU64,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compilation of `path` from content hashing to `source_hash`.
    pub fn begin(&self, path: &RequestPath, source_hash: &str) -> Ticket {
        let mut slots = self.slots.lock();

        if let Some(slot) = slots.get(path)
            && slot.source_hash == source_hash
            && !slot.is_abandoned()
        {
            debug!("Joining in-flight compilation of {}", path);
            return Ticket::Join(slot.receiver.clone());
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = watch::channel(None);

        let previous = slots.insert(
            path.clone(),
            Slot {
                generation,
                source_hash: source_hash.to_string(),
                receiver: receiver.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(
                "Compilation {} of {} supersedes compilation {}",
                generation, path, previous.generation
            );
        }

        Ticket::Lead {
            generation,
            sender,
            receiver,
        }
    }

    /// Releases the slot of a finished compilation.
    ///
    /// `apply` runs while the registry is locked and receives `true` if the
    /// compilation still owned the slot, so that its cache write cannot
    /// interleave with a newer compilation of the same path.
    pub fn complete<F>(&self, path: &RequestPath, generation: u64, apply: F)
    where
        F: FnOnce(bool),
    {
        let mut slots = self.slots.lock();
        let current = slots
            .get(path)
            .is_some_and(|slot| slot.generation == generation);
        if current {
            slots.remove(path);
        }
        apply(current);
    }

    /// Waits for the result of a compilation.
    pub async fn wait(mut receiver: watch::Receiver<Option<Outcome>>) -> Outcome {
        match receiver.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome)
                .clone()
                .unwrap_or_else(|| Err(CompileError::internal("Compilation result missing"))),
            Err(_) => Err(CompileError::internal(
                "Compilation task ended without a result",
            )),
        }
    }

    /// Returns the number of paths currently being compiled.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

}
