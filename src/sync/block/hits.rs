//! Hitsplat blocks. Two independent categories so a single tick can show two
//! splats on one actor; each carries its own health bar state and the pair
//! deliberately uses different obfuscation patterns per actor kind.

use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, Transform, WireBuf};
use crate::world::actor::{Npc, Player};

pub struct PrimaryHitBlock;

impl UpdateBlock for PrimaryHitBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::PrimaryHit
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::PRIMARY_HIT)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::PRIMARY_HIT)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        let hit = snapshot.primary_hit();
        buf.put_u8(Transform::None, hit.damage);
        buf.put_u8(Transform::Add, hit.kind);
        buf.put_u8(Transform::Negate, hit.hp_current);
        buf.put_u8(Transform::None, hit.hp_max);
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        let hit = snapshot.primary_hit();
        buf.put_u8(Transform::Add, hit.damage);
        buf.put_u8(Transform::None, hit.kind);
        buf.put_u8(Transform::Subtract, hit.hp_current);
        buf.put_u8(Transform::None, hit.hp_max);
    }
}

pub struct SecondaryHitBlock;

impl UpdateBlock for SecondaryHitBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::SecondaryHit
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::SECONDARY_HIT)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::SECONDARY_HIT)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        let hit = snapshot.secondary_hit();
        buf.put_u8(Transform::None, hit.damage);
        buf.put_u8(Transform::Subtract, hit.kind);
        buf.put_u8(Transform::None, hit.hp_current);
        buf.put_u8(Transform::Negate, hit.hp_max);
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        let hit = snapshot.secondary_hit();
        buf.put_u8(Transform::Negate, hit.damage);
        buf.put_u8(Transform::None, hit.kind);
        buf.put_u8(Transform::Add, hit.hp_current);
        buf.put_u8(Transform::None, hit.hp_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::block::tests::{test_npc, test_player, wire};
    use crate::world::types::HitSplat;

    #[test]
    fn test_player_primary_hit() {
        let mut player = test_player();
        player.add_primary_hit(HitSplat::new(12, 1, 80, 99));
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            PrimaryHitBlock.encode_player(&player, &snapshot, buf, pool)
        });
        // damage plain, kind+128, -hp_current, hp_max plain.
        assert_eq!(bytes, [12, 0x81, 0xB0, 99]);
    }

    #[test]
    fn test_npc_primary_hit() {
        let mut npc = test_npc();
        npc.add_primary_hit(HitSplat::new(12, 1, 80, 99));
        let snapshot = npc.capture_snapshot();

        let bytes = wire(|buf, _| PrimaryHitBlock.encode_npc(&npc, &snapshot, buf));
        // damage+128, kind plain, 128-hp_current, hp_max plain.
        assert_eq!(bytes, [0x8C, 1, 0x30, 99]);
    }

    #[test]
    fn test_player_secondary_hit() {
        let mut player = test_player();
        player.add_secondary_hit(HitSplat::new(5, 2, 40, 99));
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, pool| {
            SecondaryHitBlock.encode_player(&player, &snapshot, buf, pool)
        });
        assert_eq!(bytes, [5, 0x7E, 40, 0x9D]);
    }

    #[test]
    fn test_npc_secondary_hit() {
        let mut npc = test_npc();
        npc.add_secondary_hit(HitSplat::new(5, 2, 40, 99));
        let snapshot = npc.capture_snapshot();

        let bytes = wire(|buf, _| SecondaryHitBlock.encode_npc(&npc, &snapshot, buf));
        assert_eq!(bytes, [0xFB, 2, 0xA8, 99]);
    }

    #[test]
    fn test_both_hits_are_independent_categories() {
        let mut player = test_player();
        player.add_primary_hit(HitSplat::new(1, 0, 9, 10));
        let snapshot = player.capture_snapshot();

        assert!(snapshot.flags().contains(UpdateFlag::PrimaryHit));
        assert!(!snapshot.flags().contains(UpdateFlag::SecondaryHit));
    }
}
