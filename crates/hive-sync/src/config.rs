//! Configuration file management.

use std::path::PathBuf;

use hive_indexer::IndexerConfig;
use serde::{Deserialize, Serialize};

/// Complete sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Block processor settings.
    #[serde(default)]
    pub indexer: IndexerConfig,
    /// Block feed settings.
    #[serde(default)]
    pub sync: FeedConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file. Empty = $data_dir/hive.db.
    #[serde(default)]
    pub path: String,
}

/// Block feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON-lines block feed. Empty = $data_dir/blocks.jsonl.
    #[serde(default)]
    pub feed_path: String,
    /// Blocks younger than this many seconds are applied in live mode.
    #[serde(default = "default_live_lag_secs")]
    pub live_lag_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace" | "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_live_lag_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_path: String::new(),
            live_lag_secs: default_live_lag_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from `$HIVE_DATA_DIR/config.toml`.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::data_dir().join("config.toml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: SyncConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Data directory: `$HIVE_DATA_DIR`, else `~/.hive`.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("HIVE_DATA_DIR") {
            return PathBuf::from(dir);
        }
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".hive"))
            .unwrap_or_else(|_| PathBuf::from("/tmp/hive"))
    }

    /// Database file path.
    pub fn db_path(&self) -> PathBuf {
        if self.database.path.is_empty() {
            Self::data_dir().join("hive.db")
        } else {
            PathBuf::from(&self.database.path)
        }
    }

    /// Block feed path.
    pub fn feed_path(&self) -> PathBuf {
        if self.sync.feed_path.is_empty() {
            Self::data_dir().join("blocks.jsonl")
        } else {
            PathBuf::from(&self.sync.feed_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(config.database.path.is_empty());
        assert_eq!(config.sync.live_lag_secs, 60);
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.indexer.initial_flush_interval, 1000);
    }

    #[test]
    fn test_config_serialization() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: SyncConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_partial_file() {
        let config: SyncConfig = toml::from_str(
            "[indexer]\ncommunity_cutoff = 5\n\n[database]\npath = \"/var/lib/hive.db\"\n",
        )
        .expect("parse");
        assert_eq!(config.indexer.community_cutoff, 5);
        assert_eq!(config.indexer.live_flush_interval, 1);
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/hive.db"));
    }
}
