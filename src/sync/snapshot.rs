//! Staged update values and the per-tick frozen snapshot.
//!
//! [`PendingSync`] is the only way to mark a category dirty: every setter
//! stores the category's value and raises its flag in the same call, so a
//! raised flag always has a value behind it. At the start of the encode
//! phase the orchestrator freezes each flagged actor's staging area into an
//! immutable [`UpdateSnapshot`] that every observer task reads; the staging
//! area itself is cleared once, in post-sync.

use crate::sync::flags::{UpdateFlag, UpdateFlagSet};
use crate::world::types::{
    Animation, Appearance, ChatMessage, FacingTile, ForcedMovement, Graphic, HitSplat,
    InteractionTarget,
};

/// Per-actor staging area for the current tick.
///
/// Re-flagging a category within one tick overwrites its staged value; the
/// last write wins.
#[derive(Debug, Default)]
pub struct PendingSync {
    flags: UpdateFlagSet,
    appearance: Option<Appearance>,
    chat: Option<ChatMessage>,
    graphic: Option<Graphic>,
    animation: Option<Animation>,
    forced_chat: Option<String>,
    interaction: Option<InteractionTarget>,
    facing: Option<FacingTile>,
    primary_hit: Option<HitSplat>,
    secondary_hit: Option<HitSplat>,
    transform: Option<u16>,
    forced_movement: Option<ForcedMovement>,
}

impl PendingSync {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn flags(&self) -> UpdateFlagSet {
        self.flags
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub(crate) fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = Some(appearance);
        self.flags.insert(UpdateFlag::Appearance);
    }

    pub(crate) fn queue_chat(&mut self, message: ChatMessage) {
        self.chat = Some(message);
        self.flags.insert(UpdateFlag::Chat);
    }

    pub(crate) fn queue_graphic(&mut self, graphic: Graphic) {
        self.graphic = Some(graphic);
        self.flags.insert(UpdateFlag::Graphic);
    }

    pub(crate) fn queue_animation(&mut self, animation: Animation) {
        self.animation = Some(animation);
        self.flags.insert(UpdateFlag::Animation);
    }

    pub(crate) fn queue_forced_chat(&mut self, text: String) {
        self.forced_chat = Some(text);
        self.flags.insert(UpdateFlag::ForcedChat);
    }

    pub(crate) fn set_interaction(&mut self, target: InteractionTarget) {
        self.interaction = Some(target);
        self.flags.insert(UpdateFlag::InteractionTarget);
    }

    pub(crate) fn face_tile(&mut self, tile: FacingTile) {
        self.facing = Some(tile);
        self.flags.insert(UpdateFlag::FacingTile);
    }

    pub(crate) fn add_primary_hit(&mut self, hit: HitSplat) {
        self.primary_hit = Some(hit);
        self.flags.insert(UpdateFlag::PrimaryHit);
    }

    pub(crate) fn add_secondary_hit(&mut self, hit: HitSplat) {
        self.secondary_hit = Some(hit);
        self.flags.insert(UpdateFlag::SecondaryHit);
    }

    pub(crate) fn set_transform(&mut self, definition_id: u16) {
        self.transform = Some(definition_id);
        self.flags.insert(UpdateFlag::Transform);
    }

    pub(crate) fn queue_forced_movement(&mut self, movement: ForcedMovement) {
        self.forced_movement = Some(movement);
        self.flags.insert(UpdateFlag::ForcedMovement);
    }

    /// Freezes the staged state into an immutable snapshot. Staged values
    /// stay in place until [`PendingSync::clear`].
    pub fn capture(&self) -> UpdateSnapshot {
        UpdateSnapshot {
            flags: self.flags,
            appearance: self.appearance.clone(),
            chat: self.chat.clone(),
            graphic: self.graphic,
            animation: self.animation,
            forced_chat: self.forced_chat.clone(),
            interaction: self.interaction,
            facing: self.facing,
            primary_hit: self.primary_hit,
            secondary_hit: self.secondary_hit,
            transform: self.transform,
            forced_movement: self.forced_movement,
        }
    }

    /// Drops all flags and staged values. Called once per actor per tick,
    /// in post-sync.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Immutable copy of one actor's flagged state for the current tick.
///
/// Accessors for a category panic when the category was never staged; with
/// the paired setters on [`PendingSync`] that can only mean a corrupted flag
/// set, which is a bug worth failing fast on.
#[derive(Debug, Default)]
pub struct UpdateSnapshot {
    flags: UpdateFlagSet,
    appearance: Option<Appearance>,
    chat: Option<ChatMessage>,
    graphic: Option<Graphic>,
    animation: Option<Animation>,
    forced_chat: Option<String>,
    interaction: Option<InteractionTarget>,
    facing: Option<FacingTile>,
    primary_hit: Option<HitSplat>,
    secondary_hit: Option<HitSplat>,
    transform: Option<u16>,
    forced_movement: Option<ForcedMovement>,
}

macro_rules! staged {
    ($snapshot:expr, $field:ident) => {
        match &$snapshot.$field {
            Some(value) => value,
            None => panic!(concat!(stringify!($field), " flagged without a staged value")),
        }
    };
}

impl UpdateSnapshot {
    /// Snapshot with nothing flagged, used for unflagged actors entering a
    /// viewport.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn flags(&self) -> UpdateFlagSet {
        self.flags
    }

    pub fn appearance(&self) -> &Appearance {
        staged!(self, appearance)
    }

    pub fn chat(&self) -> &ChatMessage {
        staged!(self, chat)
    }

    pub fn graphic(&self) -> Graphic {
        *staged!(self, graphic)
    }

    pub fn animation(&self) -> Animation {
        *staged!(self, animation)
    }

    pub fn forced_chat(&self) -> &str {
        staged!(self, forced_chat)
    }

    pub fn interaction(&self) -> InteractionTarget {
        *staged!(self, interaction)
    }

    pub fn facing(&self) -> FacingTile {
        *staged!(self, facing)
    }

    pub fn primary_hit(&self) -> HitSplat {
        *staged!(self, primary_hit)
    }

    pub fn secondary_hit(&self) -> HitSplat {
        *staged!(self, secondary_hit)
    }

    pub fn transform(&self) -> u16 {
        *staged!(self, transform)
    }

    pub fn forced_movement(&self) -> ForcedMovement {
        *staged!(self, forced_movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setter_flags_and_stores_together() {
        let mut pending = PendingSync::new();
        assert!(pending.is_empty());

        pending.queue_animation(Animation::new(1234, 0));
        assert!(pending.flags().contains(UpdateFlag::Animation));

        let snapshot = pending.capture();
        assert!(snapshot.flags().contains(UpdateFlag::Animation));
        assert_eq!(snapshot.animation(), Animation::new(1234, 0));
    }

    #[test]
    fn test_last_write_wins_within_a_tick() {
        let mut pending = PendingSync::new();
        pending.queue_graphic(Graphic::new(10, 0, 0));
        pending.queue_graphic(Graphic::new(99, 50, 2));
        assert_eq!(pending.capture().graphic(), Graphic::new(99, 50, 2));
    }

    #[test]
    fn test_capture_carries_only_flagged_categories() {
        let mut pending = PendingSync::new();
        pending.add_primary_hit(HitSplat::new(12, 1, 80, 99));
        let snapshot = pending.capture();

        assert!(snapshot.flags().contains(UpdateFlag::PrimaryHit));
        assert!(!snapshot.flags().contains(UpdateFlag::SecondaryHit));
        assert_eq!(snapshot.primary_hit(), HitSplat::new(12, 1, 80, 99));
    }

    #[test]
    #[should_panic(expected = "without a staged value")]
    fn test_unflagged_accessor_panics() {
        UpdateSnapshot::empty().animation();
    }

    #[test]
    fn test_clear_wipes_flags_and_values() {
        let mut pending = PendingSync::new();
        pending.queue_forced_chat("Begone!".to_owned());
        pending.set_transform(50);
        pending.clear();

        assert!(pending.is_empty());
        let snapshot = pending.capture();
        assert!(snapshot.flags().is_empty());
    }

    #[test]
    fn test_no_stale_values_after_clear() {
        let mut pending = PendingSync::new();
        pending.queue_animation(Animation::new(1, 1));
        pending.clear();
        pending.queue_graphic(Graphic::new(2, 0, 0));

        let snapshot = pending.capture();
        assert!(snapshot.flags().contains(UpdateFlag::Graphic));
        assert!(!snapshot.flags().contains(UpdateFlag::Animation));
    }

    #[test]
    fn test_capture_leaves_staging_intact() {
        let mut pending = PendingSync::new();
        pending.set_interaction(InteractionTarget::at(7));
        let first = pending.capture();
        let second = pending.capture();
        assert_eq!(first.interaction(), second.interaction());
        assert!(!pending.is_empty());
    }
}
