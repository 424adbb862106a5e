use std::thread;
use std::time::Duration;

/// Synchronization engine configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Fixed tick interval in milliseconds
    pub tick_millis: u64,
    /// Encode worker threads (0 is replaced by available parallelism)
    pub worker_threads: usize,
    /// Visibility radius around each observer, in chunks
    pub view_radius_chunks: u32,
    /// Chunk distance from the viewport anchor that forces a client viewport
    /// reload
    pub viewport_refresh_chunks: u32,
    /// Player slot capacity
    pub max_players: usize,
    /// NPC slot capacity
    pub max_npcs: usize,
    /// New actors introduced to one observer per tick
    pub max_additions_per_tick: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_millis: 600,
            worker_threads: thread::available_parallelism().map_or(4, |n| n.get()),
            view_radius_chunks: 2,
            viewport_refresh_chunks: 4,
            max_players: 2047,
            max_npcs: 8191,
            max_additions_per_tick: 15,
        }
    }
}

impl SyncConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(tick) = std::env::var("TICK_MILLIS") {
            if let Ok(parsed) = tick.parse::<u64>() {
                if parsed > 0 {
                    config.tick_millis = parsed;
                } else {
                    tracing::warn!("TICK_MILLIS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid TICK_MILLIS '{}', using default", tick);
            }
        }

        if let Ok(threads) = std::env::var("WORKER_THREADS") {
            if let Ok(parsed) = threads.parse::<usize>() {
                if parsed > 0 && parsed <= 512 {
                    config.worker_threads = parsed;
                } else {
                    tracing::warn!("WORKER_THREADS must be 1-512, using default");
                }
            } else {
                tracing::warn!("Invalid WORKER_THREADS '{}', using default", threads);
            }
        }

        if let Ok(radius) = std::env::var("VIEW_RADIUS_CHUNKS") {
            if let Ok(parsed) = radius.parse::<u32>() {
                if parsed > 0 {
                    config.view_radius_chunks = parsed;
                } else {
                    tracing::warn!("VIEW_RADIUS_CHUNKS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid VIEW_RADIUS_CHUNKS '{}', using default", radius);
            }
        }

        if let Ok(refresh) = std::env::var("VIEWPORT_REFRESH_CHUNKS") {
            if let Ok(parsed) = refresh.parse::<u32>() {
                if parsed > 0 {
                    config.viewport_refresh_chunks = parsed;
                } else {
                    tracing::warn!("VIEWPORT_REFRESH_CHUNKS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid VIEWPORT_REFRESH_CHUNKS '{}', using default", refresh);
            }
        }

        if let Ok(max_players) = std::env::var("MAX_PLAYERS") {
            if let Ok(parsed) = max_players.parse::<usize>() {
                if parsed > 0 && parsed <= u16::MAX as usize {
                    config.max_players = parsed;
                } else {
                    tracing::warn!("MAX_PLAYERS must be 1-65535, using default");
                }
            } else {
                tracing::warn!("Invalid MAX_PLAYERS '{}', using default", max_players);
            }
        }

        if let Ok(max_npcs) = std::env::var("MAX_NPCS") {
            if let Ok(parsed) = max_npcs.parse::<usize>() {
                if parsed > 0 && parsed <= u16::MAX as usize {
                    config.max_npcs = parsed;
                } else {
                    tracing::warn!("MAX_NPCS must be 1-65535, using default");
                }
            } else {
                tracing::warn!("Invalid MAX_NPCS '{}', using default", max_npcs);
            }
        }

        if let Ok(additions) = std::env::var("MAX_ADDITIONS_PER_TICK") {
            if let Ok(parsed) = additions.parse::<usize>() {
                if parsed > 0 {
                    config.max_additions_per_tick = parsed;
                } else {
                    tracing::warn!("MAX_ADDITIONS_PER_TICK must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid MAX_ADDITIONS_PER_TICK '{}', using default", additions);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_millis == 0 {
            return Err("tick_millis cannot be 0".to_string());
        }
        if self.worker_threads == 0 {
            return Err("worker_threads must be at least 1".to_string());
        }
        if self.view_radius_chunks == 0 {
            return Err("view_radius_chunks must be at least 1".to_string());
        }
        if self.viewport_refresh_chunks == 0 {
            return Err("viewport_refresh_chunks must be at least 1".to_string());
        }
        if self.max_players == 0 || self.max_players > u16::MAX as usize {
            return Err("max_players must be 1-65535".to_string());
        }
        if self.max_npcs == 0 || self.max_npcs > u16::MAX as usize {
            return Err("max_npcs must be 1-65535".to_string());
        }
        if self.max_additions_per_tick == 0 {
            return Err("max_additions_per_tick must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.tick_millis, 600);
        assert_eq!(config.max_players, 2047);
        assert_eq!(config.max_npcs, 8191);
        assert!(config.worker_threads > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let config = SyncConfig::load_or_default();
        assert!(config.tick_millis > 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = SyncConfig {
            tick_millis: 0,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_capacity() {
        let config = SyncConfig {
            max_players: u16::MAX as usize + 1,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_interval() {
        let config = SyncConfig {
            tick_millis: 600,
            ..SyncConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(600));
    }
}
