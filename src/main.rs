mod config;
mod metrics;
mod net;
mod sync;
mod util;
mod wire;
mod world;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use rand::Rng;
use tracing::{info, Level};
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::metrics::SyncMetrics;
use crate::net::transport::NullTransport;
use crate::sync::SyncService;
use crate::util::position::{Direction, Position};
use crate::world::actor::World;
use crate::world::types::Animation;
use crate::world::visibility::ChunkRangeView;

/// Headless load harness: populates a synthetic world, runs the
/// synchronization service for `SIM_TICKS` ticks while churning gameplay
/// state, and dumps the final metrics.
fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Ravenfell sync server v{}", env!("CARGO_PKG_VERSION"));

    let config = SyncConfig::load_or_default();
    config
        .validate()
        .map_err(|reason| anyhow::anyhow!("invalid configuration: {reason}"))?;
    info!(
        "Configuration loaded: {}ms tick, {} workers, view radius {} chunks",
        config.tick_millis, config.worker_threads, config.view_radius_chunks
    );

    let sim_players = env_usize("SIM_PLAYERS", 200).min(config.max_players);
    let sim_npcs = env_usize("SIM_NPCS", 400).min(config.max_npcs);
    let sim_ticks = env_u64("SIM_TICKS", 100);

    let world = Arc::new(World::with_capacity(config.max_players, config.max_npcs));
    populate(&world, sim_players, sim_npcs)?;
    info!(
        "Simulated world ready: {} players, {} npcs, {} ticks to run",
        world.player_count(),
        world.npc_count(),
        sim_ticks
    );

    let metrics = Arc::new(SyncMetrics::new());
    let service = SyncService::start(
        &config,
        Arc::clone(&world),
        Arc::new(ChunkRangeView::new(config.view_radius_chunks)),
        Arc::new(NullTransport),
        Arc::clone(&metrics),
    )?;

    // Churn gameplay state while the service ticks in the background.
    let mut rng = rand::thread_rng();
    let interval = config.tick_interval();
    while metrics.tick_count.load(Ordering::Relaxed) < sim_ticks {
        churn(&world, &mut rng);
        std::thread::sleep(interval);
    }
    service.stop();

    info!(
        "Simulation finished: {} ticks, {}us/tick last (p95 {}us), cache {:.1}% hit",
        metrics.tick_count.load(Ordering::Relaxed),
        metrics.tick_time_us.load(Ordering::Relaxed),
        metrics.tick_time_p95_us.load(Ordering::Relaxed),
        metrics.cache_hit_percent()
    );
    info!("Final metrics: {}", metrics.to_json());

    Ok(())
}

fn populate(world: &World, players: usize, npcs: usize) -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    for index in 0..players {
        let name = format!("player{}", index);
        world.add_player(name, Uuid::new_v4(), random_position(&mut rng))?;
    }
    for _ in 0..npcs {
        let definition_id = rng.gen_range(1..500);
        world.add_npc(definition_id, random_position(&mut rng))?;
    }
    Ok(())
}

/// A 16x16 chunk region, dense enough that views overlap.
fn random_position(rng: &mut impl Rng) -> Position {
    Position::new(rng.gen_range(3100..3228), rng.gen_range(3100..3228), 0)
}

fn random_direction(rng: &mut impl Rng) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

/// One round of synthetic gameplay: some actors walk, a few animate or talk.
fn churn(world: &World, rng: &mut impl Rng) {
    let mut players = world.players.write();
    for (_, player) in players.iter_mut() {
        if rng.gen_bool(0.4) {
            player.motion.queue_step(random_direction(rng));
        }
        if rng.gen_bool(0.05) {
            player.queue_animation(Animation {
                id: rng.gen_range(800..900),
                delay: 0,
            });
        }
        if rng.gen_bool(0.02) {
            player.queue_chat(0, 0, "passing through");
        }
    }
    drop(players);

    let mut npcs = world.npcs.write();
    for (_, npc) in npcs.iter_mut() {
        if rng.gen_bool(0.2) {
            npc.motion.queue_step(random_direction(rng));
        }
        if rng.gen_bool(0.03) {
            npc.queue_animation(Animation {
                id: rng.gen_range(6500..6600),
                delay: 0,
            });
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
