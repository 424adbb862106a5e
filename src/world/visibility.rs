//! Visibility policy: which actors an observer should currently see.
//!
//! The synchronization engine does not own spatial storage; it asks a
//! [`ViewPolicy`] for candidates when growing an observer's local views and
//! for an in-view verdict when pruning them. The default policy is a plain
//! chunk-radius check on the same plane, which is exact and fast enough up
//! to a few thousand actors; a spatial-grid policy can replace it behind the
//! same trait without touching the engine.

use smallvec::SmallVec;

use crate::util::position::Position;
use crate::world::actor::{ActorId, Npc, Player};
use crate::world::slots::{SlotRef, SlotStore};

/// Inline capacity covers the common sparse-area case without allocating.
pub type Candidates = SmallVec<[ActorId; 16]>;

pub trait ViewPolicy: Send + Sync {
    /// Actors `observer` should see this tick, in a stable order. The
    /// observer itself is never a candidate.
    fn candidates(
        &self,
        observer: SlotRef,
        players: &SlotStore<Player>,
        npcs: &SlotStore<Npc>,
    ) -> Candidates;

    /// Whether `position` is still within `observer`'s view.
    fn in_view(&self, observer: &Player, position: Position) -> bool;
}

/// Chebyshev chunk-radius visibility on the observer's plane.
pub struct ChunkRangeView {
    radius_chunks: u32,
}

impl ChunkRangeView {
    pub fn new(radius_chunks: u32) -> Self {
        Self { radius_chunks }
    }
}

impl ViewPolicy for ChunkRangeView {
    fn candidates(
        &self,
        observer: SlotRef,
        players: &SlotStore<Player>,
        npcs: &SlotStore<Npc>,
    ) -> Candidates {
        let Some(me) = players.get(observer) else {
            return Candidates::new();
        };

        let mut out = Candidates::new();
        for (slot, player) in players.iter() {
            if slot != observer && self.in_view(me, player.position) {
                out.push(ActorId::Player(slot));
            }
        }
        for (slot, npc) in npcs.iter() {
            if self.in_view(me, npc.position) {
                out.push(ActorId::Npc(slot));
            }
        }
        out
    }

    #[inline]
    fn in_view(&self, observer: &Player, position: Position) -> bool {
        observer.position.plane == position.plane
            && observer.position.chunk_distance(&position) <= self.radius_chunks
    }
}
