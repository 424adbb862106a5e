//! Plain-data value types carried by update categories.

use crate::util::position::{Direction, Position};

/// Animation to play, with a client-side start delay in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub id: u16,
    pub delay: u8,
}

impl Animation {
    pub const fn new(id: u16, delay: u8) -> Self {
        Self { id, delay }
    }
}

/// Graphical effect (spot animation) above or on an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Graphic {
    pub id: u16,
    /// Render height above the tile, in client units.
    pub height: u16,
    pub delay: u16,
}

impl Graphic {
    pub const fn new(id: u16, height: u16, delay: u16) -> Self {
        Self { id, height, delay }
    }
}

/// Public chat line spoken by a player.
///
/// `rights` is stamped from the speaker when the message is queued, so
/// moderation badges always match the account that actually spoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub color: u8,
    pub effects: u8,
    pub rights: u8,
    pub text: String,
}

/// Scripted movement between two tile offsets, e.g. an agility jump.
///
/// Offsets are relative to the actor's position at the moment the movement
/// was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedMovement {
    pub start_dx: i8,
    pub start_dy: i8,
    pub end_dx: i8,
    pub end_dy: i8,
    /// Tick the scripted movement starts on.
    pub ticks_start: u16,
    /// Tick the actor arrives at the end offset.
    pub ticks_end: u16,
    pub direction: Direction,
}

/// One hitsplat: damage dealt plus the health bar state to draw under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitSplat {
    pub damage: u8,
    /// Splat style (miss, hit, poison, ...), a client sprite id.
    pub kind: u8,
    pub hp_current: u8,
    pub hp_max: u8,
}

impl HitSplat {
    pub const fn new(damage: u8, kind: u8, hp_current: u8, hp_max: u8) -> Self {
        Self {
            damage,
            kind,
            hp_current,
            hp_max,
        }
    }
}

/// Actor this actor is locked onto (following, combat). `None` resets the
/// client back to no target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionTarget {
    pub index: Option<u16>,
}

impl InteractionTarget {
    pub const CLEAR: InteractionTarget = InteractionTarget { index: None };

    pub const fn at(index: u16) -> Self {
        Self { index: Some(index) }
    }
}

/// Tile an actor turns to face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacingTile {
    pub x: i32,
    pub y: i32,
}

impl FacingTile {
    pub const fn at(position: Position) -> Self {
        Self {
            x: position.x,
            y: position.y,
        }
    }
}

/// Number of equipment/body style slots in an appearance descriptor.
pub const STYLE_SLOTS: usize = 7;

/// Number of recolorable body parts.
pub const TINT_SLOTS: usize = 5;

/// Everything a client needs to render a player from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    /// Body build variant.
    pub build: u8,
    /// Overhead status icon (0 = none).
    pub badge: u8,
    /// Model ids per style slot (head, torso, arms, hands, legs, feet,
    /// facial hair).
    pub styles: [u16; STYLE_SLOTS],
    /// Color indices per recolorable part.
    pub tints: [u8; TINT_SLOTS],
    /// Idle stance animation.
    pub stance: u16,
    /// Base-37 encoding of the display name.
    pub name_key: u64,
    pub combat_rating: u8,
    pub total_level: u16,
}

impl Appearance {
    /// Default render descriptor for `name`, used until gameplay customizes
    /// it.
    pub fn for_name(name: &str) -> Self {
        Self {
            build: 0,
            badge: 0,
            styles: [0, 18, 26, 33, 36, 42, 10],
            tints: [0; TINT_SLOTS],
            stance: 0x328,
            name_key: encode_name_base37(name),
            combat_rating: 3,
            total_level: 0,
        }
    }
}

/// Packs a display name into the client's base-37 integer form.
///
/// Letters map to 1..=26 case-insensitively, digits to 27..=36, anything
/// else to 0; at most twelve characters are read and trailing zero digits
/// are stripped.
pub fn encode_name_base37(name: &str) -> u64 {
    let mut value: u64 = 0;
    for c in name.chars().take(12) {
        value = value.wrapping_mul(37);
        match c {
            'A'..='Z' => value += c as u64 - 'A' as u64 + 1,
            'a'..='z' => value += c as u64 - 'a' as u64 + 1,
            '0'..='9' => value += c as u64 - '0' as u64 + 27,
            _ => {}
        }
    }
    while value % 37 == 0 && value != 0 {
        value /= 37;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base37_known_values() {
        assert_eq!(encode_name_base37(""), 0);
        assert_eq!(encode_name_base37("a"), 1);
        assert_eq!(encode_name_base37("z"), 26);
        assert_eq!(encode_name_base37("0"), 27);
        assert_eq!(encode_name_base37("abc"), 1446);
    }

    #[test]
    fn test_base37_case_insensitive() {
        assert_eq!(encode_name_base37("Abc"), encode_name_base37("abc"));
        assert_eq!(encode_name_base37("RAVEN"), encode_name_base37("raven"));
    }

    #[test]
    fn test_base37_strips_trailing_separators() {
        assert_eq!(encode_name_base37("ab "), encode_name_base37("ab"));
        assert_eq!(encode_name_base37("ab__"), encode_name_base37("ab"));
    }

    #[test]
    fn test_base37_reads_at_most_twelve_chars() {
        assert_eq!(
            encode_name_base37("abcdefghijkl"),
            encode_name_base37("abcdefghijklmnop")
        );
    }

    #[test]
    fn test_interaction_target_clear() {
        assert_eq!(InteractionTarget::CLEAR.index, None);
        assert_eq!(InteractionTarget::at(70).index, Some(70));
    }

    #[test]
    fn test_facing_tile_from_position() {
        let facing = FacingTile::at(Position::new(3200, 3201, 1));
        assert_eq!(facing.x, 3200);
        assert_eq!(facing.y, 3201);
    }

    #[test]
    fn test_default_appearance_keys_name() {
        let a = Appearance::for_name("raven");
        let b = Appearance::for_name("Raven");
        assert_eq!(a.name_key, b.name_key);
        assert_ne!(a.name_key, Appearance::for_name("crow").name_key);
    }
}
