use std::sync::Arc;

use parking_lot::Mutex;

/// Per-player cache of this tick's refresh-phase byte run.
///
/// Most observers of a player produce identical bytes for it, so the first
/// encode task to need the run caches it and the rest copy. Two tasks racing
/// the empty slot both encode the same snapshot; the first fill wins and the
/// loser's bytes are simply not cached. The slot is dropped unconditionally
/// in post-sync, so a run never leaks into the next tick.
#[derive(Debug, Default)]
pub struct EncodedCache {
    run: Mutex<Option<Arc<[u8]>>>,
}

impl EncodedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// This tick's cached run, if one has been filled.
    pub fn get(&self) -> Option<Arc<[u8]>> {
        self.run.lock().clone()
    }

    /// Fills the empty slot, first writer wins. Returns whether this call
    /// populated the cache.
    pub fn fill(&self, run: Arc<[u8]>) -> bool {
        let mut slot = self.run.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(run);
        true
    }

    /// Clears the slot. Called once per tick in post-sync.
    pub fn invalidate(&self) {
        *self.run.lock() = None;
    }
}
