//! Prometheus-compatible metrics for the synchronization engine
//!
//! Scraped by the embedding server or dumped periodically by the headless
//! harness. All hot-path updates are relaxed atomics; percentiles come from a
//! rolling window updated once per tick on the orchestrator thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Metrics registry for the synchronization engine
#[derive(Debug)]
pub struct SyncMetrics {
    // Actor counts
    pub players_online: AtomicU64,
    pub npcs_online: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub presync_time_us: AtomicU64,
    pub encode_time_us: AtomicU64,
    pub postsync_time_us: AtomicU64,

    // Tick counter
    pub tick_count: AtomicU64,

    // Encode fan-out
    pub snapshots_captured: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,

    // Delivery
    pub packets_sent: AtomicU64,
    pub sync_bytes_sent: AtomicU64,

    // Contained failures
    pub actor_failures: AtomicU64,
    pub disconnects: AtomicU64,

    // Server uptime
    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            players_online: AtomicU64::new(0),
            npcs_online: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            presync_time_us: AtomicU64::new(0),
            encode_time_us: AtomicU64::new(0),
            postsync_time_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            snapshots_captured: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            packets_sent: AtomicU64::new(0),
            sync_bytes_sent: AtomicU64::new(0),
            actor_failures: AtomicU64::new(0),
            disconnects: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(1000)),
        }
    }

    /// Record a whole-tick duration and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > 1000 {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us
                .store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Cache hit ratio over the whole run, in percent
    pub fn cache_hit_percent(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f64;
        let misses = self.cache_misses.load(Ordering::Relaxed) as f64;
        if hits + misses == 0.0 {
            return 0.0;
        }
        hits / (hits + misses) * 100.0
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(4096);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        // Actor metrics
        metric!("ravenfell_players_online", "Synchronized players", "gauge",
            self.players_online.load(Ordering::Relaxed));
        metric!("ravenfell_npcs_online", "Synchronized NPCs", "gauge",
            self.npcs_online.load(Ordering::Relaxed));

        // Tick timing
        metric!("ravenfell_tick_time_microseconds", "Current tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("ravenfell_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("ravenfell_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("ravenfell_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("ravenfell_presync_time_microseconds", "Pre-sync phase time", "gauge",
            self.presync_time_us.load(Ordering::Relaxed));
        metric!("ravenfell_encode_time_microseconds", "Parallel encode phase time", "gauge",
            self.encode_time_us.load(Ordering::Relaxed));
        metric!("ravenfell_postsync_time_microseconds", "Post-sync phase time", "gauge",
            self.postsync_time_us.load(Ordering::Relaxed));
        metric!("ravenfell_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));

        // Encode fan-out
        metric!("ravenfell_snapshots_captured_total", "Frozen per-actor snapshots", "counter",
            self.snapshots_captured.load(Ordering::Relaxed));
        metric!("ravenfell_cache_hits_total", "Refresh runs served from the per-tick cache", "counter",
            self.cache_hits.load(Ordering::Relaxed));
        metric!("ravenfell_cache_misses_total", "Refresh runs encoded fresh", "counter",
            self.cache_misses.load(Ordering::Relaxed));

        // Delivery
        metric!("ravenfell_packets_sent_total", "Messages flushed to transports", "counter",
            self.packets_sent.load(Ordering::Relaxed));
        metric!("ravenfell_sync_bytes_sent_total", "Synchronization payload bytes flushed", "counter",
            self.sync_bytes_sent.load(Ordering::Relaxed));

        // Failures
        metric!("ravenfell_actor_failures_total", "Contained per-actor tick failures", "counter",
            self.actor_failures.load(Ordering::Relaxed));
        metric!("ravenfell_disconnects_total", "Sessions torn down", "counter",
            self.disconnects.load(Ordering::Relaxed));

        metric!("ravenfell_uptime_seconds", "Engine uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics (alternative for direct API access)
    pub fn to_json(&self) -> String {
        format!(
            r#"{{
  "actors": {{
    "players": {},
    "npcs": {}
  }},
  "timing": {{
    "tick_time_us": {},
    "tick_time_p95_us": {},
    "tick_time_p99_us": {},
    "tick_time_max_us": {},
    "presync_time_us": {},
    "encode_time_us": {},
    "postsync_time_us": {},
    "tick_count": {}
  }},
  "encode": {{
    "snapshots_captured": {},
    "cache_hits": {},
    "cache_misses": {},
    "cache_hit_percent": {:.1}
  }},
  "delivery": {{
    "packets_sent": {},
    "sync_bytes_sent": {}
  }},
  "failures": {{
    "actor_failures": {},
    "disconnects": {}
  }},
  "uptime_seconds": {}
}}"#,
            self.players_online.load(Ordering::Relaxed),
            self.npcs_online.load(Ordering::Relaxed),
            self.tick_time_us.load(Ordering::Relaxed),
            self.tick_time_p95_us.load(Ordering::Relaxed),
            self.tick_time_p99_us.load(Ordering::Relaxed),
            self.tick_time_max_us.load(Ordering::Relaxed),
            self.presync_time_us.load(Ordering::Relaxed),
            self.encode_time_us.load(Ordering::Relaxed),
            self.postsync_time_us.load(Ordering::Relaxed),
            self.tick_count.load(Ordering::Relaxed),
            self.snapshots_captured.load(Ordering::Relaxed),
            self.cache_hits.load(Ordering::Relaxed),
            self.cache_misses.load(Ordering::Relaxed),
            self.cache_hit_percent(),
            self.packets_sent.load(Ordering::Relaxed),
            self.sync_bytes_sent.load(Ordering::Relaxed),
            self.actor_failures.load(Ordering::Relaxed),
            self.disconnects.load(Ordering::Relaxed),
            self.uptime_seconds(),
        )
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = SyncMetrics::new();
        assert_eq!(metrics.players_online.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = SyncMetrics::new();

        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }

        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 100);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) > 0);
        assert!(metrics.tick_time_p99_us.load(Ordering::Relaxed) > 0);
        assert!(
            metrics.tick_time_p99_us.load(Ordering::Relaxed)
                >= metrics.tick_time_p95_us.load(Ordering::Relaxed)
        );
    }

    #[test]
    fn test_cache_hit_percent() {
        let metrics = SyncMetrics::new();
        assert_eq!(metrics.cache_hit_percent(), 0.0);

        metrics.cache_hits.store(3, Ordering::Relaxed);
        metrics.cache_misses.store(1, Ordering::Relaxed);
        assert_eq!(metrics.cache_hit_percent(), 75.0);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = SyncMetrics::new();
        metrics.players_online.store(50, Ordering::Relaxed);
        metrics.cache_hits.store(9, Ordering::Relaxed);

        let output = metrics.to_prometheus();

        assert!(output.contains("ravenfell_players_online 50"));
        assert!(output.contains("ravenfell_cache_hits_total 9"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_json_format() {
        let metrics = SyncMetrics::new();
        metrics.players_online.store(100, Ordering::Relaxed);

        let output = metrics.to_json();

        assert!(output.contains("\"players\": 100"));
        assert!(output.contains("\"timing\":"));
        assert!(output.contains("\"encode\":"));
    }
}
