//! The three-phase tick orchestrator.
//!
//! A tick is pre-sync, encode, post-sync in strict order. Pre-sync and
//! post-sync run on the orchestrator thread under the world write locks;
//! encode fans one task per observer out over a dedicated worker pool under
//! the read locks and joins on a [`TickBarrier`] before post-sync starts.
//!
//! Failure containment: every per-actor unit of work runs under
//! `catch_unwind`. A panicking pre-sync actor or encode task costs that one
//! actor its session; the tick itself always completes. Worker panics must
//! be caught inside the task, an unwind that escapes a pooled job would
//! abort the process.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::SyncConfig;
use crate::metrics::SyncMetrics;
use crate::net::queue::OutgoingMessage;
use crate::net::transport::Transport;
use crate::sync::barrier::TickBarrier;
use crate::sync::block::{CacheOutcome, NpcBlockSet, PlayerBlockSet};
use crate::sync::snapshot::UpdateSnapshot;
use crate::sync::SyncPhase;
use crate::wire::{BufferPool, WireBuf};
use crate::world::actor::{ActorId, World};
use crate::world::slots::SlotRef;
use crate::world::visibility::ViewPolicy;

/// Flagged state frozen at the start of the encode phase. Actors with an
/// empty flag set have no entry.
type SnapshotTable = FxHashMap<ActorId, Arc<UpdateSnapshot>>;

pub struct SyncEngine {
    world: Arc<World>,
    policy: Arc<dyn ViewPolicy>,
    transport: Arc<dyn Transport>,
    metrics: Arc<SyncMetrics>,
    workers: rayon::ThreadPool,
    barrier: Arc<TickBarrier>,
    buffers: Arc<BufferPool>,
    /// Observers whose encode task failed this tick; reaped in post-sync.
    pending_disconnects: Arc<Mutex<Vec<SlotRef>>>,
    viewport_refresh_chunks: u32,
    max_additions_per_tick: usize,
    tick: u64,
}

impl SyncEngine {
    pub fn new(
        config: &SyncConfig,
        world: Arc<World>,
        policy: Arc<dyn ViewPolicy>,
        transport: Arc<dyn Transport>,
        metrics: Arc<SyncMetrics>,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|index| format!("sync-worker-{}", index))
            .build()?;
        tracing::info!(
            "Synchronization engine ready: {} worker threads, {} additions/tick cap",
            config.worker_threads,
            config.max_additions_per_tick
        );

        Ok(Self {
            world,
            policy,
            transport,
            metrics,
            workers,
            barrier: Arc::new(TickBarrier::new()),
            buffers: Arc::new(BufferPool::new(64)),
            pending_disconnects: Arc::new(Mutex::new(Vec::new())),
            viewport_refresh_chunks: config.viewport_refresh_chunks,
            max_additions_per_tick: config.max_additions_per_tick,
            tick: 0,
        })
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Runs one complete tick.
    pub fn synchronize(&mut self) {
        self.tick += 1;
        let tick_start = Instant::now();

        let phase_start = Instant::now();
        self.pre_sync();
        self.metrics
            .presync_time_us
            .store(phase_start.elapsed().as_micros() as u64, Ordering::Relaxed);

        let phase_start = Instant::now();
        self.encode();
        self.metrics
            .encode_time_us
            .store(phase_start.elapsed().as_micros() as u64, Ordering::Relaxed);

        let phase_start = Instant::now();
        self.post_sync();
        self.metrics
            .postsync_time_us
            .store(phase_start.elapsed().as_micros() as u64, Ordering::Relaxed);

        self.metrics.record_tick_time(tick_start.elapsed());
        tracing::trace!("Tick {} finished in {:?}", self.tick, tick_start.elapsed());
    }

    /// Phase 1: movement and viewport upkeep under the write locks.
    fn pre_sync(&self) {
        let mut players = self.world.players.write();
        let mut failed: Vec<SlotRef> = Vec::new();

        for (slot, player) in players.iter_mut() {
            let refresh_chunks = self.viewport_refresh_chunks;
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                player.motion.advance(&mut player.position);

                let drift = player.viewport_anchor().chebyshev(&player.position.chunk());
                if drift >= refresh_chunks {
                    let anchor = player.rebase_viewport();
                    player
                        .queue()
                        .push(OutgoingMessage::ViewportRefresh { anchor });
                    tracing::debug!(
                        "Player '{}' rebased viewport on chunk ({}, {})",
                        player.username(),
                        anchor.x,
                        anchor.y
                    );
                }
            }));
            if let Err(payload) = result {
                tracing::error!(
                    "Pre-sync failed for player slot {}: {}",
                    slot.index,
                    panic_message(payload.as_ref())
                );
                failed.push(slot);
            }
        }
        for slot in failed {
            if let Some(player) = players.remove(slot) {
                self.metrics.actor_failures.fetch_add(1, Ordering::Relaxed);
                self.metrics.disconnects.fetch_add(1, Ordering::Relaxed);
                self.transport.close(player.session(), "pre-sync failure");
            }
        }
        drop(players);

        let mut npcs = self.world.npcs.write();
        let mut failed: Vec<SlotRef> = Vec::new();
        for (slot, npc) in npcs.iter_mut() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                npc.motion.advance(&mut npc.position);
            }));
            if let Err(payload) = result {
                tracing::error!(
                    "Pre-sync failed for npc slot {}: {}",
                    slot.index,
                    panic_message(payload.as_ref())
                );
                failed.push(slot);
            }
        }
        for slot in failed {
            if npcs.remove(slot).is_some() {
                self.metrics.actor_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Phase 2: snapshot capture, then one encode task per observer.
    fn encode(&self) {
        let snapshots = Arc::new(self.capture_snapshots());

        let observers: Vec<SlotRef> = {
            let players = self.world.players.read();
            players.iter().map(|(slot, _)| slot).collect()
        };

        self.barrier.register(observers.len());
        for observer in observers {
            let world = Arc::clone(&self.world);
            let policy = Arc::clone(&self.policy);
            let buffers = Arc::clone(&self.buffers);
            let metrics = Arc::clone(&self.metrics);
            let barrier = Arc::clone(&self.barrier);
            let snapshots = Arc::clone(&snapshots);
            let disconnects = Arc::clone(&self.pending_disconnects);
            let max_additions = self.max_additions_per_tick;

            self.workers.spawn(move || {
                // Taken before any fallible work and held for the whole task,
                // so the orchestrator unblocks even if the task unwinds.
                let _arrival = barrier.arrival();
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    encode_observer(
                        &world,
                        policy.as_ref(),
                        &buffers,
                        &metrics,
                        &snapshots,
                        observer,
                        max_additions,
                    );
                }));
                if let Err(payload) = result {
                    tracing::error!(
                        "Encode task for player slot {} failed: {}",
                        observer.index,
                        panic_message(payload.as_ref())
                    );
                    metrics.actor_failures.fetch_add(1, Ordering::Relaxed);
                    disconnects.lock().push(observer);
                }
            });
        }
        self.barrier.wait();
    }

    fn capture_snapshots(&self) -> SnapshotTable {
        let players = self.world.players.read();
        let npcs = self.world.npcs.read();

        let mut table = SnapshotTable::default();
        for (slot, player) in players.iter() {
            if !player.update_flags().is_empty() {
                table.insert(ActorId::Player(slot), Arc::new(player.capture_snapshot()));
            }
        }
        for (slot, npc) in npcs.iter() {
            if !npc.update_flags().is_empty() {
                table.insert(ActorId::Npc(slot), Arc::new(npc.capture_snapshot()));
            }
        }
        self.metrics
            .snapshots_captured
            .fetch_add(table.len() as u64, Ordering::Relaxed);
        table
    }

    /// Phase 3: flush queues, reset per-tick state, reap failed sessions.
    fn post_sync(&self) {
        let mut players = self.world.players.write();
        let mut npcs = self.world.npcs.write();

        let mut undeliverable: Vec<SlotRef> = Vec::new();
        for (slot, player) in players.iter() {
            let mut failed = false;
            for message in player.queue().drain() {
                if failed {
                    // Keep draining so the queue is empty, the session is gone.
                    continue;
                }
                match self.transport.deliver(player.session(), &message) {
                    Ok(()) => {
                        self.metrics.packets_sent.fetch_add(1, Ordering::Relaxed);
                        if let OutgoingMessage::SyncUpdate(run) = &message {
                            self.metrics
                                .sync_bytes_sent
                                .fetch_add(run.len() as u64, Ordering::Relaxed);
                        }
                    }
                    Err(error) => {
                        tracing::warn!("Dropping session {}: {}", player.session(), error);
                        failed = true;
                        undeliverable.push(slot);
                    }
                }
            }
        }

        for (_, player) in players.iter_mut() {
            player.clear_pending();
            // Snapshots are per tick; a run cached this tick is stale next tick.
            player.cache().invalidate();
        }
        for (_, npc) in npcs.iter_mut() {
            npc.clear_pending();
        }

        let mut to_remove = std::mem::take(&mut *self.pending_disconnects.lock());
        to_remove.extend(undeliverable);
        for slot in to_remove {
            if let Some(player) = players.remove(slot) {
                self.transport
                    .close(player.session(), "synchronization failure");
                self.metrics.disconnects.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    "Player '{}' disconnected after a failed tick",
                    player.username()
                );
            }
        }

        self.metrics
            .players_online
            .store(players.len() as u64, Ordering::Relaxed);
        self.metrics
            .npcs_online
            .store(npcs.len() as u64, Ordering::Relaxed);
    }
}

/// Builds one observer's synchronization run and queues it. Runs on a worker
/// thread under the world read locks; panics are caught by the spawning task.
fn encode_observer(
    world: &World,
    policy: &dyn ViewPolicy,
    buffers: &BufferPool,
    metrics: &SyncMetrics,
    snapshots: &SnapshotTable,
    observer: SlotRef,
    max_additions: usize,
) {
    let players = world.players.read();
    let npcs = world.npcs.read();
    let Some(me) = players.get(observer) else {
        // Removed after the task list was drawn up; nothing owed.
        return;
    };

    let _claim = me.views().claim();
    let mut packet = WireBuf::with_capacity(128);
    let empty = UpdateSnapshot::empty();

    // The observer's own flagged state leads the run.
    if let Some(snapshot) = snapshots.get(&ActorId::Player(observer)) {
        PlayerBlockSet.encode(me, snapshot, SyncPhase::SelfUpdate, &mut packet, buffers);
    }

    // Drop targets that despawned or left the view.
    me.views().prune_working(|target| {
        let keep = match target {
            ActorId::Player(slot) => players
                .get(slot)
                .is_some_and(|player| policy.in_view(me, player.position)),
            ActorId::Npc(slot) => npcs
                .get(slot)
                .is_some_and(|npc| policy.in_view(me, npc.position)),
        };
        if !keep {
            me.views().remove_local(target);
        }
        !keep
    });

    // Refresh the survivors in working-view order.
    for target in me.views().working() {
        let Some(snapshot) = snapshots.get(&target) else {
            continue;
        };
        match target {
            ActorId::Player(slot) => {
                let Some(player) = players.get(slot) else {
                    continue;
                };
                let outcome = PlayerBlockSet.encode_refresh(player, snapshot, &mut packet, buffers);
                match outcome {
                    CacheOutcome::Hit => {
                        metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                    }
                    CacheOutcome::Miss => {
                        metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            ActorId::Npc(slot) => {
                let Some(npc) = npcs.get(slot) else {
                    continue;
                };
                NpcBlockSet.encode(npc, snapshot, &mut packet);
            }
        }
    }

    // Introduce newcomers, capped so one tick never floods a client.
    let mut additions = 0;
    for candidate in policy.candidates(observer, &players, &npcs) {
        if additions == max_additions {
            break;
        }
        if !me.views().add(candidate) {
            continue;
        }
        additions += 1;

        let snapshot = match snapshots.get(&candidate) {
            Some(snapshot) => snapshot.as_ref(),
            None => &empty,
        };
        match candidate {
            ActorId::Player(slot) => {
                let Some(player) = players.get(slot) else {
                    continue;
                };
                PlayerBlockSet.encode(player, snapshot, SyncPhase::LocalAdd, &mut packet, buffers);
            }
            ActorId::Npc(slot) => {
                let Some(npc) = npcs.get(slot) else {
                    continue;
                };
                NpcBlockSet.encode(npc, snapshot, &mut packet);
            }
        }
    }

    if !packet.is_empty() {
        me.queue()
            .push(OutgoingMessage::SyncUpdate(Arc::from(packet.into_vec())));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}
