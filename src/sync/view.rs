//! Per-observer local-view bookkeeping.
//!
//! Each human observer tracks which actors it currently sees in two halves:
//! an ordered *working view* that only the observer's own encode task may
//! touch, and a *mirror view* any thread may query. The working view's
//! iteration order is the order targets are encoded in, so it must never be
//! perturbed by another thread; the mirror exists so cross-cutting systems
//! (area effects, targeting) can ask "does X see Y" without entering the
//! encode task.
//!
//! The single-writer rule is enforced at runtime: a task claims the
//! repository for its thread before mutating and releases it when done.
//! Mutations from any other thread are bugs and panic at the call site.
//!
//! Lock order inside this type is working -> owner/mirror; the prune
//! predicate runs under the working lock and must only call back into
//! [`LocalViews::remove_local`], never into working-view operations.

use std::thread::{self, ThreadId};

use hashbrown::HashSet;
use parking_lot::{Mutex, RwLock};

use crate::world::actor::ActorId;

#[derive(Debug)]
pub struct LocalViews {
    working: Mutex<Vec<ActorId>>,
    mirror: RwLock<HashSet<ActorId>>,
    owner: Mutex<Option<ThreadId>>,
}

impl LocalViews {
    pub fn new() -> Self {
        Self {
            working: Mutex::new(Vec::new()),
            mirror: RwLock::new(HashSet::new()),
            owner: Mutex::new(None),
        }
    }

    /// Binds mutation rights to the calling thread for the duration of the
    /// returned guard. Exactly one task per observer runs per tick, so an
    /// existing claim means two tasks were spawned for the same observer.
    pub fn claim(&self) -> ViewClaim<'_> {
        let mut owner = self.owner.lock();
        if let Some(existing) = *owner {
            panic!(
                "local views already claimed by {existing:?}; one encode task per observer per tick"
            );
        }
        *owner = Some(thread::current().id());
        ViewClaim { views: self }
    }

    /// Inserts `actor` into both views; the mirror first, so the actor is
    /// never visible in the working view without mirror membership. Returns
    /// false when the actor was already present.
    ///
    /// Claimed thread only.
    pub fn add(&self, actor: ActorId) -> bool {
        self.assert_owner("add");
        let mut working = self.working.lock();
        if !self.mirror.write().insert(actor) {
            return false;
        }
        working.push(actor);
        true
    }

    /// Removes `actor` from the mirror view only; its working-view entry
    /// stays until the next [`LocalViews::prune_working`] drops it.
    ///
    /// Claimed thread only.
    pub fn remove_local(&self, actor: ActorId) {
        self.assert_owner("remove_local");
        self.mirror.write().remove(&actor);
    }

    /// Removes every working-view entry the predicate matches, preserving
    /// the order of survivors. The predicate removes the mirror half itself
    /// via [`LocalViews::remove_local`], so both views agree by the time
    /// this returns.
    ///
    /// Claimed thread only.
    pub fn prune_working(&self, mut predicate: impl FnMut(ActorId) -> bool) {
        self.assert_owner("prune_working");
        self.working.lock().retain(|actor| !predicate(*actor));
    }

    /// Membership in the mirror view. Safe from any thread.
    pub fn in_local_view(&self, actor: ActorId) -> bool {
        self.mirror.read().contains(&actor)
    }

    /// Membership in the working view. Claimed thread only.
    pub fn in_working_view(&self, actor: ActorId) -> bool {
        self.assert_owner("in_working_view");
        self.working.lock().contains(&actor)
    }

    /// Copy of the working view in iteration order. Claimed thread only.
    pub fn working(&self) -> Vec<ActorId> {
        self.assert_owner("working");
        self.working.lock().clone()
    }

    /// Working-view size. Claimed thread only.
    pub fn working_len(&self) -> usize {
        self.assert_owner("working_len");
        self.working.lock().len()
    }

    fn assert_owner(&self, operation: &str) {
        let current = thread::current().id();
        match *self.owner.lock() {
            Some(owner) if owner == current => {}
            Some(owner) => panic!(
                "local view {operation} from {current:?} but the updating thread is {owner:?}"
            ),
            None => panic!("local view {operation} from {current:?} with no claimed updating thread"),
        }
    }
}

impl Default for LocalViews {
    fn default() -> Self {
        Self::new()
    }
}

/// Claim over a [`LocalViews`]; releases on drop, including on unwind, so a
/// failed encode task never wedges the next tick's claim.
pub struct ViewClaim<'a> {
    views: &'a LocalViews,
}

impl Drop for ViewClaim<'_> {
    fn drop(&mut self) {
        *self.views.owner.lock() = None;
    }
}
