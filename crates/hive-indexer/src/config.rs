//! Indexer settings.

use serde::{Deserialize, Serialize};

/// Tuning of the block processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Root posts created at or before this time (unix seconds) are never
    /// assigned to a community.
    #[serde(default = "default_community_cutoff")]
    pub community_cutoff: u64,
    /// Blocks per batch-job range during initial sync.
    #[serde(default = "default_initial_flush_interval")]
    pub initial_flush_interval: u32,
    /// Blocks per batch-job range during live sync.
    #[serde(default = "default_live_flush_interval")]
    pub live_flush_interval: u32,
    /// Blocks between reputation rank refreshes.
    #[serde(default = "default_rank_refresh_interval")]
    pub rank_refresh_interval: u32,
}

// 2019-12-01T00:00:00Z
fn default_community_cutoff() -> u64 {
    1_575_158_400
}

fn default_initial_flush_interval() -> u32 {
    1000
}

fn default_live_flush_interval() -> u32 {
    1
}

fn default_rank_refresh_interval() -> u32 {
    1000
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            community_cutoff: default_community_cutoff(),
            initial_flush_interval: default_initial_flush_interval(),
            live_flush_interval: default_live_flush_interval(),
            rank_refresh_interval: default_rank_refresh_interval(),
        }
    }
}

impl IndexerConfig {
    /// Range length for the given sync mode. Never zero.
    pub fn flush_interval(&self, mode: hive_types::SyncMode) -> u32 {
        let interval = if mode.is_initial() {
            self.initial_flush_interval
        } else {
            self.live_flush_interval
        };
        interval.max(1)
    }
}
