//! Synchronization benchmarks for the Ravenfell server
//!
//! Measures the full tick and the hot encode paths at various population
//! sizes to verify the ~2000 concurrent player target.
//!
//! Run with: cargo bench --bench sync_tick

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use ravenfell_server::config::SyncConfig;
use ravenfell_server::metrics::SyncMetrics;
use ravenfell_server::net::transport::NullTransport;
use ravenfell_server::sync::block::PlayerBlockSet;
use ravenfell_server::sync::{SyncEngine, SyncPhase};
use ravenfell_server::util::position::{Direction, Position};
use ravenfell_server::wire::{BufferPool, WireBuf};
use ravenfell_server::world::actor::{Player, World};
use ravenfell_server::world::types::{
    Animation, FacingTile, ForcedMovement, Graphic, HitSplat, InteractionTarget,
};
use ravenfell_server::world::visibility::ChunkRangeView;
use uuid::Uuid;

/// Create a world with actors spread over a 16x16 chunk region, dense enough
/// that local views overlap heavily.
fn create_world(players: usize, npcs: usize) -> Arc<World> {
    let world = Arc::new(World::with_capacity(players.max(1), npcs.max(1)));
    let mut rng = rand::thread_rng();

    for i in 0..players {
        let position = Position::new(rng.gen_range(3100..3228), rng.gen_range(3100..3228), 0);
        world
            .add_player(format!("bench{}", i), Uuid::new_v4(), position)
            .unwrap();
    }
    for _ in 0..npcs {
        let position = Position::new(rng.gen_range(3100..3228), rng.gen_range(3100..3228), 0);
        world.add_npc(rng.gen_range(1..500), position).unwrap();
    }
    world
}

fn create_engine(world: Arc<World>, players: usize, npcs: usize) -> SyncEngine {
    let config = SyncConfig {
        max_players: players.max(1),
        max_npcs: npcs.max(1),
        ..SyncConfig::default()
    };
    SyncEngine::new(
        &config,
        world,
        Arc::new(ChunkRangeView::new(config.view_radius_chunks)),
        Arc::new(NullTransport),
        Arc::new(SyncMetrics::new()),
    )
    .unwrap()
}

/// Flag a tenth of the population, the way a busy tick looks.
fn flag_tenth(world: &World) {
    let mut players = world.players.write();
    for (i, (_, player)) in players.iter_mut().enumerate() {
        if i % 10 == 0 {
            player.queue_animation(Animation::new(875, 0));
        }
        if i % 10 == 5 {
            player.queue_chat(0, 0, "benchmark line");
        }
    }
    drop(players);

    let mut npcs = world.npcs.write();
    for (i, (_, npc)) in npcs.iter_mut().enumerate() {
        if i % 10 == 0 {
            npc.queue_animation(Animation::new(6580, 0));
        }
    }
}

/// A player with every update category staged, for codec micro-benchmarks.
fn fully_flagged_player() -> Player {
    let mut player = Player::new("benchmark", Uuid::new_v4(), Position::new(3200, 3200, 0));
    player.queue_forced_movement(ForcedMovement {
        start_dx: 0,
        start_dy: 0,
        end_dx: 3,
        end_dy: -2,
        ticks_start: 10,
        ticks_end: 60,
        direction: Direction::East,
    });
    player.queue_graphic(Graphic::new(444, 100, 0));
    player.queue_animation(Animation::new(875, 0));
    player.queue_forced_chat("Ow!");
    player.queue_chat(0, 0, "benchmark line");
    player.set_interaction(InteractionTarget::at(70));
    let appearance = player.appearance().clone();
    player.set_appearance(appearance);
    player.face_tile(FacingTile { x: 3201, y: 3200 });
    player.add_primary_hit(HitSplat::new(12, 1, 80, 99));
    player.add_secondary_hit(HitSplat::new(5, 2, 75, 99));
    player
}

/// Benchmark a complete tick at various population sizes
fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(30);

    for count in [100, 250, 500, 1000, 2000] {
        let world = create_world(count, count);
        let mut engine = create_engine(Arc::clone(&world), count, count);

        // Run enough ticks that every observer's local views are full, so
        // the measurement covers steady state rather than the join burst.
        for _ in 0..64 {
            engine.synchronize();
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("players_npcs", count), &count, |b, _| {
            b.iter(|| {
                flag_tenth(&world);
                engine.synchronize();
            })
        });
    }
    group.finish();
}

/// Benchmark the block codec with every category flagged at once
fn bench_block_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_encode");
    group.sample_size(100);

    let player = fully_flagged_player();
    let snapshot = player.capture_snapshot();
    let pool = BufferPool::new(64);

    group.bench_function("all_categories", |b| {
        let mut buf = WireBuf::with_capacity(256);
        b.iter(|| {
            buf.clear();
            PlayerBlockSet.encode(
                &player,
                black_box(&snapshot),
                SyncPhase::LocalRefresh,
                &mut buf,
                &pool,
            );
            black_box(buf.len())
        })
    });
    group.finish();
}

/// Benchmark the shared refresh cache on both sides of the race
fn bench_refresh_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh_cache");
    group.sample_size(100);

    let target = fully_flagged_player();
    let snapshot = target.capture_snapshot();
    let pool = BufferPool::new(64);

    group.bench_function("miss", |b| {
        let mut buf = WireBuf::with_capacity(256);
        b.iter(|| {
            target.cache().invalidate();
            buf.clear();
            black_box(PlayerBlockSet.encode_refresh(&target, &snapshot, &mut buf, &pool))
        })
    });

    group.bench_function("hit", |b| {
        let mut buf = WireBuf::with_capacity(256);
        // Prime the cache once; every iteration after copies the cached run.
        PlayerBlockSet.encode_refresh(&target, &snapshot, &mut buf, &pool);
        b.iter(|| {
            buf.clear();
            black_box(PlayerBlockSet.encode_refresh(&target, &snapshot, &mut buf, &pool))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_full_tick,
    bench_block_encode,
    bench_refresh_cache,
);

criterion_main!(benches);
