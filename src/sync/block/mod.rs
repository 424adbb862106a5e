//! Update block encoders, one per category.
//!
//! A block owns three things: the [`UpdateFlag`] that selects it, its mask
//! bit in each actor kind's namespace, and the payload bytes it appends.
//! Blocks never write their own mask bit; the set encoder in [`set`] collects
//! the bits for every selected block, writes the combined mask once, then
//! runs the payload encoders in the fixed wire order below. Both the bit
//! assignments and the order are client contract and cannot be rearranged.

use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, WireBuf};
use crate::world::actor::{Npc, Player};

mod animation;
mod appearance;
mod chat;
mod facing;
mod forced_chat;
mod graphic;
mod hits;
mod interaction;
mod movement;
mod set;
mod transform;

pub use animation::AnimationBlock;
pub use appearance::AppearanceBlock;
pub use chat::ChatBlock;
pub use facing::FacingBlock;
pub use forced_chat::ForcedChatBlock;
pub use graphic::GraphicBlock;
pub use hits::{PrimaryHitBlock, SecondaryHitBlock};
pub use interaction::InteractionBlock;
pub use movement::ForcedMovementBlock;
pub use set::{CacheOutcome, NpcBlockSet, PlayerBlockSet};
pub use transform::TransformBlock;

/// Mask bit assignments, one namespace per actor kind.
///
/// The namespaces are unrelated: the same category sits on different bits
/// for players and NPCs, and neither side may borrow the other's table.
pub mod mask {
    /// Human-controlled actors. An 11-bit namespace; masks above `0xFF`
    /// trigger the two-byte extended form tagged with [`player::EXTENDED`].
    pub mod player {
        pub const INTERACTION: u16 = 0x1;
        pub const FACING: u16 = 0x2;
        pub const APPEARANCE: u16 = 0x4;
        pub const ANIMATION: u16 = 0x8;
        pub const FORCED_CHAT: u16 = 0x10;
        /// Marker bit, never assigned to a category: its presence in a wire
        /// mask tells the client a second mask byte follows.
        pub const EXTENDED: u16 = 0x20;
        pub const CHAT: u16 = 0x40;
        pub const PRIMARY_HIT: u16 = 0x80;
        pub const FORCED_MOVEMENT: u16 = 0x100;
        pub const GRAPHIC: u16 = 0x200;
        pub const SECONDARY_HIT: u16 = 0x400;
    }

    /// Server-controlled actors. Pinned to the low byte; there is no
    /// extended form on this side of the protocol.
    pub mod npc {
        pub const TRANSFORM: u16 = 0x1;
        pub const ANIMATION: u16 = 0x2;
        pub const GRAPHIC: u16 = 0x4;
        pub const FACING: u16 = 0x8;
        pub const SECONDARY_HIT: u16 = 0x10;
        pub const FORCED_CHAT: u16 = 0x20;
        pub const INTERACTION: u16 = 0x40;
        pub const PRIMARY_HIT: u16 = 0x80;
    }
}

/// One update category's encoder.
///
/// `player_mask`/`npc_mask` return `None` when the category does not exist
/// for that actor kind; the matching `encode_*` default then panics, because
/// reaching it means a set encoder selected a block its own mask table says
/// it cannot have.
pub trait UpdateBlock: Sync {
    /// Flag that selects this block.
    fn flag(&self) -> UpdateFlag;

    /// Mask bit in the human-controlled namespace.
    fn player_mask(&self) -> Option<u16> {
        None
    }

    /// Mask bit in the server-controlled namespace.
    fn npc_mask(&self) -> Option<u16> {
        None
    }

    fn encode_player(
        &self,
        _player: &Player,
        _snapshot: &UpdateSnapshot,
        _buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        panic!("{:?} block does not support human-controlled actors", self.flag());
    }

    fn encode_npc(&self, _npc: &Npc, _snapshot: &UpdateSnapshot, _buf: &mut WireBuf) {
        panic!("{:?} block does not support server-controlled actors", self.flag());
    }
}

/// Wire order of human-controlled blocks. Client contract.
pub static PLAYER_ORDER: [&dyn UpdateBlock; 10] = [
    &ForcedMovementBlock,
    &GraphicBlock,
    &AnimationBlock,
    &ForcedChatBlock,
    &ChatBlock,
    &InteractionBlock,
    &AppearanceBlock,
    &FacingBlock,
    &PrimaryHitBlock,
    &SecondaryHitBlock,
];

/// Wire order of server-controlled blocks. Client contract.
pub static NPC_ORDER: [&dyn UpdateBlock; 8] = [
    &AnimationBlock,
    &PrimaryHitBlock,
    &GraphicBlock,
    &InteractionBlock,
    &ForcedChatBlock,
    &SecondaryHitBlock,
    &TransformBlock,
    &FacingBlock,
];
