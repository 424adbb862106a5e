use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, WireBuf};
use crate::world::actor::{Npc, Player};

/// Scripted overhead text, terminated string payload. Unlike public chat it
/// carries no style word and is never suppressed for the speaker.
pub struct ForcedChatBlock;

impl UpdateBlock for ForcedChatBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::ForcedChat
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::FORCED_CHAT)
    }

    fn npc_mask(&self) -> Option<u16> {
        Some(mask::npc::FORCED_CHAT)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        buf.put_terminated(snapshot.forced_chat());
    }

    fn encode_npc(&self, _npc: &Npc, snapshot: &UpdateSnapshot, buf: &mut WireBuf) {
        buf.put_terminated(snapshot.forced_chat());
    }
}
