use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{ByteOrder, Transform, WireBuf};
use crate::world::actor::Npc;

/// Swaps the definition an NPC renders as. Server-controlled actors only.
pub struct TransformBlock;

impl UpdateBlock for TransformBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::Transform
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::TRANSFORM)
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        buf.put_u16(ByteOrder::Little, Transform::Add, snapshot.transform());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::block::tests::{test_npc, test_player, wire};
    use crate::wire::BufferPool;

    #[test]
    fn test_definition_id_little_endian_with_add() {
        let mut npc = test_npc();
        npc.set_transform(0x0234);
        let snapshot = npc.capture_snapshot();

        let bytes = wire(|buf, _| TransformBlock.encode_npc(&npc, &snapshot, buf));
        assert_eq!(bytes, [0xB4, 0x02]);
    }

    #[test]
    #[should_panic(expected = "does not support human-controlled")]
    fn test_player_side_is_a_defect() {
        let player = test_player();
        let pool = BufferPool::new(16);
        let mut buf = crate::wire::WireBuf::new();
        TransformBlock.encode_player(&player, &UpdateSnapshot::empty(), &mut buf, &pool);
    }
}
