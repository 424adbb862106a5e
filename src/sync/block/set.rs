//! Set encoders: combined mask first, then payloads in wire order.
//!
//! A set encoder walks its kind's fixed block order twice with the same
//! selection predicate. The first pass folds the mask bits of every selected
//! block, the second appends their payloads, so the mask always lands before
//! byte one of any payload and always agrees with the payloads that follow.

use std::sync::Arc;

use crate::sync::block::{mask, UpdateBlock, NPC_ORDER, PLAYER_ORDER};
use crate::sync::flags::{UpdateFlag, UpdateFlagSet};
use crate::sync::snapshot::UpdateSnapshot;
use crate::sync::SyncPhase;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::{Npc, Player};

/// Whether a refresh-phase byte run came from the target's cache or had to
/// be produced by this observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// Assembles one player's block run for one observer.
pub struct PlayerBlockSet;

impl PlayerBlockSet {
    /// Phase-dependent block selection:
    /// - additions always carry appearance, flagged or not, so the observer
    ///   can render the newcomer;
    /// - the self run never carries chat, the speaker's client already echoed
    ///   the line locally;
    /// - everything else follows the flags.
    fn selects(phase: SyncPhase, flags: UpdateFlagSet, block: &dyn UpdateBlock) -> bool {
        match (phase, block.flag()) {
            (SyncPhase::LocalAdd, UpdateFlag::Appearance) => true,
            (SyncPhase::SelfUpdate, UpdateFlag::Chat) => false,
            (_, flag) => flags.contains(flag),
        }
    }

    fn mask_bit(block: &dyn UpdateBlock) -> u16 {
        match block.player_mask() {
            Some(bit) => bit,
            None => panic!(
                "{:?} block selected for a human-controlled actor without a mask bit",
                block.flag()
            ),
        }
    }

    /// Writes the combined mask and every selected payload for `player` into
    /// `buf`.
    pub fn encode(
        &self,
        player: &Player,
        snapshot: &UpdateSnapshot,
        phase: SyncPhase,
        buf: &mut WireBuf,
        scratch: &BufferPool,
    ) {
        let flags = snapshot.flags();
        let mut combined = 0u16;
        for block in PLAYER_ORDER {
            if Self::selects(phase, flags, block) {
                combined |= Self::mask_bit(block);
            }
        }

        // Zero included categories means zero bytes, not a zero mask byte.
        if combined == 0 {
            return;
        }

        if combined > 0xFF {
            buf.put_u16(
                ByteOrder::Little,
                Transform::None,
                combined | mask::player::EXTENDED,
            );
        } else {
            buf.put_u8(Transform::None, combined as u8);
        }

        for block in PLAYER_ORDER {
            if Self::selects(phase, flags, block) {
                block.encode_player(player, snapshot, buf, scratch);
            }
        }
    }

    /// Refresh run for `target`, served from its per-tick cache when some
    /// earlier observer already produced it.
    pub fn encode_refresh(
        &self,
        target: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        scratch: &BufferPool,
    ) -> CacheOutcome {
        if let Some(run) = target.cache().get() {
            buf.put_bytes(&run);
            return CacheOutcome::Hit;
        }

        let mut fresh = scratch.acquire();
        self.encode(target, snapshot, SyncPhase::LocalRefresh, &mut fresh, scratch);
        // Losing this race is fine: both runs encode the same frozen
        // snapshot, so the bytes are identical either way.
        target.cache().fill(Arc::from(fresh.as_slice()));
        buf.put_bytes(fresh.as_slice());
        CacheOutcome::Miss
    }
}

/// Assembles one NPC's block run. NPCs have no self run and no forced
/// appearance, so selection is the flag set alone and no phase is taken.
pub struct NpcBlockSet;

impl NpcBlockSet {
    fn mask_bit(block: &dyn UpdateBlock) -> u16 {
        match block.npc_mask() {
            Some(bit) => bit,
            None => panic!(
                "{:?} block selected for a server-controlled actor without a mask bit",
                block.flag()
            ),
        }
    }

    pub fn encode(&self, npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        let flags = snapshot.flags();
        let mut combined = 0u16;
        for block in NPC_ORDER {
            if flags.contains(block.flag()) {
                combined |= Self::mask_bit(block);
            }
        }
        if combined == 0 {
            return;
        }
        // The one-byte form is all this namespace has; a category pushing the
        // mask wider needs a wire format revision first.
        if combined > 0xFF {
            panic!("server-controlled combined mask {combined:#x} exceeds one byte");
        }
        buf.put_u8(Transform::None, combined as u8);

        for block in NPC_ORDER {
            if flags.contains(block.flag()) {
                block.encode_npc(npc, snapshot, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::block::tests::{test_npc, test_player, wire};
    use crate::world::types::{Animation, Graphic};

    #[test]
    fn test_refresh_animation_run() {
        let mut player = test_player();
        player.queue_animation(Animation::new(1234, 0));
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            PlayerBlockSet.encode(&player, &snapshot, SyncPhase::LocalRefresh, buf, pool)
        });
        // Mask byte 0x08, then id 1234 little-endian, then negated delay 0.
        assert_eq!(bytes, [0x08, 0xD2, 0x04, 0x00]);
    }

    #[test]
    fn test_extended_mask_goes_out_as_two_bytes() {
        let mut player = test_player();
        player.queue_animation(Animation::new(1234, 0));
        player.queue_graphic(Graphic::new(0x30, 0, 0));
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            PlayerBlockSet.encode(&player, &snapshot, SyncPhase::LocalRefresh, buf, pool)
        });
        // 0x208 | 0x20 = 0x228, low byte first; then graphic before animation.
        assert_eq!(
            bytes,
            [0x28, 0x02, 0x00, 0x30, 0x00, 0x00, 0x00, 0x00, 0xD2, 0x04, 0x00]
        );
    }

    #[test]
    fn test_compact_mask_stays_one_byte() {
        let mut player = test_player();
        player.queue_animation(Animation::new(1, 0));
        player.queue_chat(0, 0, "hi");
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            PlayerBlockSet.encode(&player, &snapshot, SyncPhase::LocalRefresh, buf, pool)
        });
        assert_eq!(bytes[0], 0x48);
        assert_ne!(bytes[1], 0x00, "second byte is payload, not a mask half");
    }

    #[test]
    fn test_addition_forces_appearance_without_its_flag() {
        let player = test_player();
        let bytes = wire(|buf, pool| {
            PlayerBlockSet.encode(
                &player,
                &UpdateSnapshot::empty(),
                SyncPhase::LocalAdd,
                buf,
                pool,
            )
        });
        // Mask 0x04, length byte 34, the reversed descriptor.
        assert_eq!(bytes[0], 0x04);
        assert_eq!(bytes[1], 34);
        assert_eq!(bytes.len(), 36);
    }

    #[test]
    fn test_self_run_drops_chat_only() {
        let mut player = test_player();
        player.queue_animation(Animation::new(7, 0));
        player.queue_chat(0, 0, "hi");
        let snapshot = player.capture_snapshot();

        let self_run = wire(|buf, pool| {
            PlayerBlockSet.encode(&player, &snapshot, SyncPhase::SelfUpdate, buf, pool)
        });
        assert_eq!(self_run, [0x08, 0x07, 0x00, 0x00]);

        let refresh_run = wire(|buf, pool| {
            PlayerBlockSet.encode(&player, &snapshot, SyncPhase::LocalRefresh, buf, pool)
        });
        assert_eq!(refresh_run[0], 0x48);
    }

    #[test]
    fn test_no_included_categories_emits_no_bytes() {
        // Chat is the only flag and the self run drops it.
        let mut player = test_player();
        player.queue_chat(0, 0, "hi");
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            PlayerBlockSet.encode(&player, &snapshot, SyncPhase::SelfUpdate, buf, pool)
        });
        assert!(bytes.is_empty());

        // Same for a wholly unflagged refresh.
        let bytes = wire(|buf, pool| {
            PlayerBlockSet.encode(
                &player,
                &UpdateSnapshot::empty(),
                SyncPhase::LocalRefresh,
                buf,
                pool,
            )
        });
        assert!(bytes.is_empty());

        let npc = test_npc();
        let bytes = wire(|buf, _| NpcBlockSet.encode(&npc, &UpdateSnapshot::empty(), buf));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_refresh_fills_cache_once() {
        let mut player = test_player();
        player.queue_animation(Animation::new(1234, 0));
        let snapshot = player.capture_snapshot();

        let first = wire(|buf, pool| {
            assert_eq!(
                PlayerBlockSet.encode_refresh(&player, &snapshot, buf, pool),
                CacheOutcome::Miss
            );
        });
        let second = wire(|buf, pool| {
            assert_eq!(
                PlayerBlockSet.encode_refresh(&player, &snapshot, buf, pool),
                CacheOutcome::Hit
            );
        });
        assert_eq!(first, second);
        assert_eq!(first, [0x08, 0xD2, 0x04, 0x00]);
    }

    #[test]
    fn test_invalidation_reopens_the_cache() {
        let mut player = test_player();
        player.queue_animation(Animation::new(1, 1));
        let snapshot = player.capture_snapshot();

        wire(|buf, pool| {
            PlayerBlockSet.encode_refresh(&player, &snapshot, buf, pool);
        });
        player.cache().invalidate();

        wire(|buf, pool| {
            assert_eq!(
                PlayerBlockSet.encode_refresh(&player, &snapshot, buf, pool),
                CacheOutcome::Miss
            );
        });
    }

    #[test]
    fn test_npc_run_mask_then_payloads() {
        let mut npc = test_npc();
        npc.queue_animation(Animation::new(1234, 0));
        let snapshot = npc.capture_snapshot();

        let bytes = wire(|buf, _| NpcBlockSet.encode(&npc, &snapshot, buf));
        assert_eq!(bytes, [0x02, 0xD2, 0x04, 0x00]);
    }

    #[test]
    fn test_npc_order_differs_from_player_order() {
        let mut npc = test_npc();
        npc.queue_animation(Animation::new(5, 0));
        npc.set_transform(60);
        let snapshot = npc.capture_snapshot();

        let bytes = wire(|buf, _| NpcBlockSet.encode(&npc, &snapshot, buf));
        // Mask 0x03; animation payload first, transform last.
        assert_eq!(bytes, [0x03, 0x05, 0x00, 0x00, 0xBC, 0x00]);
    }
}
