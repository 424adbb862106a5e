use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::{Npc, Player};

/// Turns the actor toward a tile. Coordinates go out doubled plus one so the
/// client can aim at tile centers on its half-tile grid.
pub struct FacingBlock;

#[inline]
fn centered(coordinate: i32) -> u16 {
    (2 * coordinate + 1) as u16
}

impl UpdateBlock for FacingBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::FacingTile
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::FACING)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::FACING)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        let tile = snapshot.facing();
        buf.put_u16(ByteOrder::Little, Transform::Add, centered(tile.x));
        buf.put_u16(ByteOrder::Little, Transform::None, centered(tile.y));
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        let tile = snapshot.facing();
        buf.put_u16(ByteOrder::Big, Transform::None, centered(tile.x));
        buf.put_u16(ByteOrder::Big, Transform::None, centered(tile.y));
    }
}
