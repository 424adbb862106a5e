use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::{Npc, Player};

/// Animation payload: id (u16 little-endian), then start delay (u8 negated).
pub struct AnimationBlock;

impl UpdateBlock for AnimationBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::Animation
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::ANIMATION)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::ANIMATION)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        write_animation(snapshot, buf);
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        write_animation(snapshot, buf);
    }
}

fn write_animation(snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
    let animation = snapshot.animation();
    buf.put_u16(ByteOrder::Little, Transform::None, animation.id);
    buf.put_u8(Transform::Negate, animation.delay);
}
