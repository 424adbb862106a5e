use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::{Npc, Player};

/// Graphic payload: id (u16 big-endian), then height and delay packed into
/// one u32 big-endian as `height << 16 | delay`.
pub struct GraphicBlock;

impl UpdateBlock for GraphicBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::Graphic
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::GRAPHIC)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::GRAPHIC)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        write_graphic(snapshot, buf);
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        write_graphic(snapshot, buf);
    }
}

fn write_graphic(snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
    let graphic = snapshot.graphic();
    buf.put_u16(ByteOrder::Big, Transform::None, graphic.id);
    let packed = (graphic.height as u32) << 16 | graphic.delay as u32;
    buf.put_u32(ByteOrder::Big, Transform::None, packed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::block::tests::{test_player, wire};
    use crate::world::types::Graphic;

    #[test]
    fn test_height_and_delay_pack_into_one_word() {
        let mut player = test_player();
        player.queue_graphic(Graphic::new(0x0123, 0x0200, 0x0001));
        let snapshot = player.capture_snapshot();

        let bytes =
            wire(|buf, scratch| GraphicBlock.encode_player(&player, &snapshot, buf, scratch));
        assert_eq!(bytes, [0x01, 0x23, 0x02, 0x00, 0x00, 0x01]);
    }
}
