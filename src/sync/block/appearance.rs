use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::Player;
use crate::world::types::Appearance;

/// Full render descriptor for a player. The only block that can be forced
/// without its flag set: additions to a viewport always carry it, falling
/// back to the player's persistent descriptor when nothing was staged this
/// tick.
///
/// The descriptor is built in a scratch buffer first because the client
/// reads the sub-block backwards behind a plain length byte.
pub struct AppearanceBlock;

impl UpdateBlock for AppearanceBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::Appearance
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::APPEARANCE)
    }

    fn encode_player(
        &self,
        player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        scratch: &BufferPool,
    ) {
        let descriptor = if snapshot.flags().contains(UpdateFlag::Appearance) {
            snapshot.appearance()
        } else {
            player.appearance()
        };

        let mut sub = scratch.acquire();
        write_descriptor(descriptor, &mut sub);
        buf.put_u8(Transform::None, sub.len() as u8);
        buf.put_bytes_reversed(sub.as_slice());
    }
}

fn write_descriptor(descriptor: &Appearance, buf: &mut WireBuf) {
    buf.put_u8(Transform::None, descriptor.build);
    buf.put_u8(Transform::None, descriptor.badge);
    for style in descriptor.styles {
        buf.put_u16(ByteOrder::Big, Transform::None, style);
    }
    for tint in descriptor.tints {
        buf.put_u8(Transform::None, tint);
    }
    buf.put_u16(ByteOrder::Big, Transform::None, descriptor.stance);
    buf.put_u64(ByteOrder::Big, Transform::None, descriptor.name_key);
    buf.put_u8(Transform::None, descriptor.combat_rating);
    buf.put_u16(ByteOrder::Big, Transform::None, descriptor.total_level);
}
