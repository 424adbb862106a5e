use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::Player;

/// Scripted slide between two tile offsets. Human-controlled actors only;
/// server-controlled actors route everything through ordinary steps.
pub struct ForcedMovementBlock;

impl UpdateBlock for ForcedMovementBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::ForcedMovement
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::FORCED_MOVEMENT)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        let movement = snapshot.forced_movement();
        buf.put_u8(Transform::Subtract, movement.start_dx as u8);
        buf.put_u8(Transform::Subtract, movement.start_dy as u8);
        buf.put_u8(Transform::Subtract, movement.end_dx as u8);
        buf.put_u8(Transform::Subtract, movement.end_dy as u8);
        buf.put_u16(ByteOrder::Little, Transform::Add, movement.ticks_start);
        buf.put_u16(ByteOrder::Big, Transform::None, movement.ticks_end);
        buf.put_u8(Transform::None, movement.direction.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::block::tests::{test_player, wire};
    use crate::util::position::Direction;
    use crate::world::types::ForcedMovement;

    #[test]
    fn test_forced_movement_payload() {
        let mut player = test_player();
        player.queue_forced_movement(ForcedMovement {
            start_dx: 0,
            start_dy: 0,
            end_dx: 3,
            end_dy: -2,
            ticks_start: 10,
            ticks_end: 60,
            direction: Direction::East,
        });
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            ForcedMovementBlock.encode_player(&player, &snapshot, buf, pool)
        });
        assert_eq!(
            bytes,
            [
                0x80, 0x80, // 128 - 0, twice
                0x7D, // 128 - 3
                0x82, // 128 - (-2 as u8)
                0x8A, 0x00, // ticks_start 10, little-endian with Add
                0x00, 0x3C, // ticks_end 60, big-endian
                Direction::East.id(),
            ]
        );
    }
}
