//! Owns the orchestrator thread: paces the engine with a fixed-timestep
//! timer and tears it down on request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;

use crate::config::SyncConfig;
use crate::metrics::SyncMetrics;
use crate::net::transport::Transport;
use crate::sync::engine::SyncEngine;
use crate::util::tick::TickTimer;
use crate::world::actor::World;
use crate::world::visibility::ViewPolicy;

/// One stats line roughly every 30 seconds at the default tick rate.
const STATS_EVERY_TICKS: u64 = 50;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to spawn the orchestrator thread: {0}")]
    Orchestrator(#[from] std::io::Error),
}

pub struct SyncService {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SyncService {
    /// Builds the engine and starts ticking on a dedicated thread.
    pub fn start(
        config: &SyncConfig,
        world: Arc<World>,
        policy: Arc<dyn ViewPolicy>,
        transport: Arc<dyn Transport>,
        metrics: Arc<SyncMetrics>,
    ) -> Result<Self, ServiceError> {
        let mut engine = SyncEngine::new(config, world, policy, transport, Arc::clone(&metrics))?;
        let interval = config.tick_interval();
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_shutdown = Arc::clone(&shutdown);
        let handle = std::thread::Builder::new()
            .name("sync-orchestrator".to_owned())
            .spawn(move || run_loop(&mut engine, interval, &thread_shutdown, &metrics))?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Signals the loop to stop and joins the orchestrator thread. The
    /// in-flight tick, if any, runs to completion first.
    pub fn stop(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Orchestrator thread panicked");
            }
        }
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop(
    engine: &mut SyncEngine,
    interval: Duration,
    shutdown: &AtomicBool,
    metrics: &SyncMetrics,
) {
    let mut timer = TickTimer::new(interval);
    tracing::info!("Synchronization loop started, one tick per {:?}", interval);

    while !shutdown.load(Ordering::Relaxed) {
        let report = timer.wait();
        if report.late {
            tracing::warn!("Tick {} started {:?} past its deadline", report.tick, report.overrun);
        }

        engine.synchronize();

        if engine.tick() % STATS_EVERY_TICKS == 0 {
            tracing::info!(
                "Tick {}: {} players, {} npcs | {}us/tick (p95 {}us) | cache {:.1}% hit",
                engine.tick(),
                metrics.players_online.load(Ordering::Relaxed),
                metrics.npcs_online.load(Ordering::Relaxed),
                metrics.tick_time_us.load(Ordering::Relaxed),
                metrics.tick_time_p95_us.load(Ordering::Relaxed),
                metrics.cache_hit_percent()
            );
        }
    }

    tracing::info!(
        "Synchronization loop stopped after {} ticks ({} late)",
        engine.tick(),
        timer.late_ticks()
    );
}
