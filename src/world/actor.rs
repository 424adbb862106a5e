//! Actor state and world-level storage.
//!
//! `Player` and `Npc` expose one paired set-and-flag method per update
//! category they support. Kind-illegal categories (appearance on an NPC,
//! transform on a player) simply do not exist on the type, so gameplay code
//! cannot flag them. The staging area behind those methods is private;
//! nothing outside this module can raise a flag without staging a value.

use parking_lot::RwLock;
use thiserror::Error;

use crate::net::queue::MessageQueue;
use crate::net::transport::SessionId;
use crate::sync::cache::EncodedCache;
use crate::sync::flags::UpdateFlagSet;
use crate::sync::snapshot::{PendingSync, UpdateSnapshot};
use crate::sync::view::LocalViews;
use crate::util::position::{ChunkPoint, Position};
use crate::world::motion::Motion;
use crate::world::slots::{SlotRef, SlotStore};
use crate::world::types::{
    Animation, Appearance, ChatMessage, FacingTile, ForcedMovement, Graphic, HitSplat,
    InteractionTarget,
};

/// Kind-tagged actor reference, the element type of local views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorId {
    Player(SlotRef),
    Npc(SlotRef),
}

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("player capacity {0} reached")]
    PlayerCapacity(usize),
    #[error("npc capacity {0} reached")]
    NpcCapacity(usize),
}

/// A human-controlled actor.
#[derive(Debug)]
pub struct Player {
    session: SessionId,
    username: String,
    rights: u8,
    pub position: Position,
    pub motion: Motion,
    viewport_anchor: ChunkPoint,
    appearance: Appearance,
    pending: PendingSync,
    views: LocalViews,
    cache: EncodedCache,
    queue: MessageQueue,
}

impl Player {
    pub fn new(username: impl Into<String>, session: SessionId, position: Position) -> Self {
        let username = username.into();
        let appearance = Appearance::for_name(&username);
        Self {
            session,
            username,
            rights: 0,
            position,
            motion: Motion::new(),
            viewport_anchor: position.chunk(),
            appearance,
            pending: PendingSync::new(),
            views: LocalViews::new(),
            cache: EncodedCache::new(),
            queue: MessageQueue::new(),
        }
    }

    #[inline]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn rights(&self) -> u8 {
        self.rights
    }

    pub fn set_rights(&mut self, rights: u8) {
        self.rights = rights;
    }

    /// Persistent render descriptor, the baseline when appearance is not
    /// flagged this tick.
    #[inline]
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    #[inline]
    pub fn viewport_anchor(&self) -> ChunkPoint {
        self.viewport_anchor
    }

    /// Re-anchors the viewport on the current chunk and returns the new
    /// anchor. Called when a viewport refresh is queued.
    pub fn rebase_viewport(&mut self) -> ChunkPoint {
        self.viewport_anchor = self.position.chunk();
        self.viewport_anchor
    }

    /// Moves the player instantly, discarding any queued route.
    pub fn teleport(&mut self, position: Position) {
        self.position = position;
        self.motion.clear();
    }

    #[inline]
    pub fn views(&self) -> &LocalViews {
        &self.views
    }

    #[inline]
    pub fn cache(&self) -> &EncodedCache {
        &self.cache
    }

    #[inline]
    pub fn queue(&self) -> &MessageQueue {
        &self.queue
    }

    #[inline]
    pub fn update_flags(&self) -> UpdateFlagSet {
        self.pending.flags()
    }

    pub fn capture_snapshot(&self) -> UpdateSnapshot {
        self.pending.capture()
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    // ==================== paired set-and-flag surface ====================

    /// Replaces the persistent render descriptor and flags appearance, so
    /// observers re-render this player this tick.
    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = appearance.clone();
        self.pending.set_appearance(appearance);
    }

    /// Queues a public chat line. The speaker's rights are stamped here, not
    /// taken from the caller.
    pub fn queue_chat(&mut self, color: u8, effects: u8, text: impl Into<String>) {
        let message = ChatMessage {
            color,
            effects,
            rights: self.rights,
            text: text.into(),
        };
        self.pending.queue_chat(message);
    }

    pub fn queue_graphic(&mut self, graphic: Graphic) {
        self.pending.queue_graphic(graphic);
    }

    pub fn queue_animation(&mut self, animation: Animation) {
        self.pending.queue_animation(animation);
    }

    pub fn queue_forced_chat(&mut self, text: impl Into<String>) {
        self.pending.queue_forced_chat(text.into());
    }

    pub fn set_interaction(&mut self, target: InteractionTarget) {
        self.pending.set_interaction(target);
    }

    pub fn face_tile(&mut self, tile: FacingTile) {
        self.pending.face_tile(tile);
    }

    pub fn add_primary_hit(&mut self, hit: HitSplat) {
        self.pending.add_primary_hit(hit);
    }

    pub fn add_secondary_hit(&mut self, hit: HitSplat) {
        self.pending.add_secondary_hit(hit);
    }

    pub fn queue_forced_movement(&mut self, movement: ForcedMovement) {
        self.pending.queue_forced_movement(movement);
    }
}

/// A server-controlled actor.
#[derive(Debug)]
pub struct Npc {
    definition_id: u16,
    pub position: Position,
    pub motion: Motion,
    pending: PendingSync,
}

impl Npc {
    pub fn new(definition_id: u16, position: Position) -> Self {
        Self {
            definition_id,
            position,
            motion: Motion::new(),
            pending: PendingSync::new(),
        }
    }

    #[inline]
    pub fn definition_id(&self) -> u16 {
        self.definition_id
    }

    #[inline]
    pub fn update_flags(&self) -> UpdateFlagSet {
        self.pending.flags()
    }

    pub fn capture_snapshot(&self) -> UpdateSnapshot {
        self.pending.capture()
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    // ==================== paired set-and-flag surface ====================

    pub fn queue_animation(&mut self, animation: Animation) {
        self.pending.queue_animation(animation);
    }

    pub fn queue_graphic(&mut self, graphic: Graphic) {
        self.pending.queue_graphic(graphic);
    }

    pub fn queue_forced_chat(&mut self, text: impl Into<String>) {
        self.pending.queue_forced_chat(text.into());
    }

    pub fn set_interaction(&mut self, target: InteractionTarget) {
        self.pending.set_interaction(target);
    }

    pub fn face_tile(&mut self, tile: FacingTile) {
        self.pending.face_tile(tile);
    }

    pub fn add_primary_hit(&mut self, hit: HitSplat) {
        self.pending.add_primary_hit(hit);
    }

    pub fn add_secondary_hit(&mut self, hit: HitSplat) {
        self.pending.add_secondary_hit(hit);
    }

    /// Disguises this NPC as another definition until cleared by gameplay.
    pub fn set_transform(&mut self, definition_id: u16) {
        self.pending.set_transform(definition_id);
    }
}

/// All synchronized actors.
///
/// Phases 1 and 3 of the tick take the write locks on the orchestrator
/// thread; phase-2 encode tasks take read locks. Per-player state mutated
/// inside phase 2 (views, cache, queue) synchronizes itself and is reached
/// through a shared reference.
pub struct World {
    pub players: RwLock<SlotStore<Player>>,
    pub npcs: RwLock<SlotStore<Npc>>,
}

impl World {
    pub fn with_capacity(max_players: usize, max_npcs: usize) -> Self {
        Self {
            players: RwLock::new(SlotStore::with_capacity(max_players)),
            npcs: RwLock::new(SlotStore::with_capacity(max_npcs)),
        }
    }

    pub fn add_player(
        &self,
        username: impl Into<String>,
        session: SessionId,
        position: Position,
    ) -> Result<SlotRef, WorldError> {
        let mut players = self.players.write();
        let capacity = players.capacity();
        players
            .insert(Player::new(username, session, position))
            .map_err(|_| WorldError::PlayerCapacity(capacity))
    }

    pub fn add_npc(&self, definition_id: u16, position: Position) -> Result<SlotRef, WorldError> {
        let mut npcs = self.npcs.write();
        let capacity = npcs.capacity();
        npcs.insert(Npc::new(definition_id, position))
            .map_err(|_| WorldError::NpcCapacity(capacity))
    }

    pub fn remove_player(&self, slot: SlotRef) -> Option<Player> {
        self.players.write().remove(slot)
    }

    pub fn remove_npc(&self, slot: SlotRef) -> Option<Npc> {
        self.npcs.write().remove(slot)
    }

    pub fn player_count(&self) -> usize {
        self.players.read().len()
    }

    pub fn npc_count(&self) -> usize {
        self.npcs.read().len()
    }
}
