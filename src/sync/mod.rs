//! Per-tick actor state synchronization.
//!
//! Every tick, each connected player receives one personalized packet
//! describing what changed around them: their own flagged state, the flagged
//! state of actors already in their local view, and full introductions for
//! actors that just entered it. Gameplay marks changes through the paired
//! set-and-flag setters on `Player`/`Npc`; this module freezes those
//! changes, encodes them once per source where possible, and fans the bytes
//! out to every observer in parallel.

pub mod barrier;
pub mod block;
pub mod cache;
pub mod engine;
pub mod flags;
pub mod service;
pub mod snapshot;
pub mod view;

pub use engine::SyncEngine;
pub use service::SyncService;

/// Which slice of the observer's packet a block run belongs to.
///
/// The phase changes block selection, not block encoding: additions force
/// the appearance block and the self run drops public chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// The observer's own flagged state.
    SelfUpdate,
    /// Flagged state of actors already in the observer's local view.
    LocalRefresh,
    /// Introductions for actors entering the local view this tick.
    LocalAdd,
}
