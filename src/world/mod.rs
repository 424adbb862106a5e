//! Actor, world, and visibility model.

pub mod actor;
pub mod motion;
pub mod slots;
pub mod types;
pub mod visibility;

pub use actor::{ActorId, Npc, Player, World, WorldError};
pub use slots::{SlotRef, SlotStore};
