use crate::sync::block::{mask, UpdateBlock};
use crate::sync::flags::UpdateFlag;
use crate::sync::snapshot::UpdateSnapshot;
use crate::wire::{BufferPool, ByteOrder, Transform, WireBuf};
use crate::world::actor::Player;

/// Public chat, human-only: color/effects word (u16 little-endian), speaker
/// rights (u8), negated length byte, then the message bytes in reverse.
pub struct ChatBlock;

impl UpdateBlock for ChatBlock {
    fn flag(&self) -> UpdateFlag {
        UpdateFlag::Chat
    }

    fn player_mask(&self) -> Option<u16> {
        Some(mask::player::CHAT)
    }

    fn encode_player(
        &self,
        _player: &Player,
        snapshot: &UpdateSnapshot,
        buf: &mut WireBuf,
        _scratch: &BufferPool,
    ) {
        let chat = snapshot.chat();
        // The length field is one byte; the client ignores anything longer.
        let text = &chat.text.as_bytes()[..chat.text.len().min(255)];

        let style = (chat.color as u16) << 8 | chat.effects as u16;
        buf.put_u16(ByteOrder::Little, Transform::None, style);
        buf.put_u8(Transform::None, chat.rights);
        buf.put_u8(Transform::Negate, text.len() as u8);
        buf.put_bytes_reversed(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::block::tests::{test_npc, test_player, wire};

    #[test]
    fn test_message_bytes_are_reversed() {
        let mut player = test_player();
        player.set_rights(1);
        player.queue_chat(0x02, 0x01, "Hi");
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, scratch| ChatBlock.encode_player(&player, &snapshot, buf, scratch));
        // style LE = [effects-carrying low byte, color], rights, -len, "iH"
        assert_eq!(bytes, [0x01, 0x02, 0x01, 0xFE, 0x69, 0x48]);
    }

    #[test]
    fn test_long_message_truncates_to_255_bytes() {
        let mut player = test_player();
        let mut text = "A".to_owned();
        text.push_str(&"b".repeat(253));
        text.push('C');
        text.push_str(&"z".repeat(45));
        player.queue_chat(0, 0, text);
        let snapshot = player.capture_snapshot();

        let bytes = wire(|buf, scratch| ChatBlock.encode_player(&player, &snapshot, buf, scratch));
        // style + rights + length + 255 kept bytes; the tail never goes out.
        assert_eq!(bytes.len(), 2 + 1 + 1 + 255);
        assert_eq!(bytes[3], 0x01, "negated length of 255");
        // Reversed copy of the kept prefix only: its last byte leads, its
        // first byte lands last.
        assert_eq!(bytes[4], b'C');
        assert_eq!(*bytes.last().unwrap(), b'A');
        assert!(!bytes.contains(&b'z'));
    }

    #[test]
    #[should_panic(expected = "does not support server-controlled")]
    fn test_npc_side_is_a_defect() {
        let npc = test_npc();
        let snapshot = npc.capture_snapshot();
        wire(|buf, _| ChatBlock.encode_npc(&npc, &snapshot, buf));
    }
}
