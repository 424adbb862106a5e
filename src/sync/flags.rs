use std::fmt;

/// Category of actor state that changed this tick.
///
/// Flags are internal bookkeeping: their bit positions here are not the wire
/// mask bits, which differ per actor-kind namespace (see `sync::block`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum UpdateFlag {
    Appearance,
    Chat,
    Graphic,
    Animation,
    ForcedChat,
    InteractionTarget,
    FacingTile,
    PrimaryHit,
    SecondaryHit,
    Transform,
    ForcedMovement,
}

impl UpdateFlag {
    pub const ALL: [UpdateFlag; 11] = [
        UpdateFlag::Appearance,
        UpdateFlag::Chat,
        UpdateFlag::Graphic,
        UpdateFlag::Animation,
        UpdateFlag::ForcedChat,
        UpdateFlag::InteractionTarget,
        UpdateFlag::FacingTile,
        UpdateFlag::PrimaryHit,
        UpdateFlag::SecondaryHit,
        UpdateFlag::Transform,
        UpdateFlag::ForcedMovement,
    ];

    #[inline]
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of update categories flagged on one actor for the current tick.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateFlagSet(u16);

impl UpdateFlagSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn insert(&mut self, flag: UpdateFlag) {
        self.0 |= flag.bit();
    }

    #[inline]
    pub fn contains(&self, flag: UpdateFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl fmt::Debug for UpdateFlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for flag in UpdateFlag::ALL {
            if self.contains(flag) {
                set.entry(&flag);
            }
        }
        set.finish()
    }
}
