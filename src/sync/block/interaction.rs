use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::{Npc, Player};

/// Sentinel index the client reads as "no target".
const NO_TARGET: u16 = 0xFFFF;

/// Locks the actor onto a target actor or releases it.
pub struct InteractionBlock;

impl UpdateBlock for InteractionBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::InteractionTarget
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::INTERACTION)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::INTERACTION)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        let index = snapshot.interaction().index.unwrap_or(NO_TARGET);
        buf.put_u16(ByteOrder::Little, Transform::Add, index);
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        let index = snapshot.interaction().index.unwrap_or(NO_TARGET);
        buf.put_u16(ByteOrder::Big, Transform::None, index);
    }
}
