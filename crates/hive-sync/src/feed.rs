//! JSON-lines block feed replay.
//!
//! One block per line, as `hive_types::Block` JSON. Blocks whose timestamp
//! is within `live_lag_secs` of the wall clock are applied in live mode,
//! older ones in initial-sync mode.

use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use hive_indexer::{BlockOutcome, Indexer};
use hive_types::{Block, SyncMode};

/// Counters of one replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: u64,
    pub skipped: u64,
    pub operations: u64,
}

/// Sync mode for a block with timestamp `block_time` seen at `now`.
pub fn mode_for(block_time: u64, now: u64, live_lag_secs: u64) -> SyncMode {
    if now.saturating_sub(block_time) <= live_lag_secs {
        SyncMode::Live
    } else {
        SyncMode::Initial
    }
}

/// Replay the feed file until its end or until `stop` is set.
pub fn replay_file(
    indexer: &mut Indexer,
    path: &Path,
    live_lag_secs: u64,
    stop: &AtomicBool,
) -> anyhow::Result<ReplayStats> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening block feed {}", path.display()))?;
    replay(indexer, std::io::BufReader::new(file), live_lag_secs, stop)
}

/// Replay blocks from `reader`, then run the pending batch jobs.
pub fn replay(
    indexer: &mut Indexer,
    reader: impl BufRead,
    live_lag_secs: u64,
    stop: &AtomicBool,
) -> anyhow::Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for (index, line) in reader.lines().enumerate() {
        if stop.load(Ordering::SeqCst) {
            tracing::info!(line = index + 1, "replay interrupted");
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let block: Block = serde_json::from_str(&line)
            .with_context(|| format!("feed line {} is not a block", index + 1))?;

        let mode = mode_for(block.timestamp, unix_now(), live_lag_secs);
        match indexer.process_block(&block, mode)? {
            BlockOutcome::Applied { operations } => {
                stats.applied += 1;
                stats.operations += operations as u64;
            }
            BlockOutcome::AlreadyApplied => stats.skipped += 1,
        }
    }
    indexer.finish()?;
    Ok(stats)
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_indexer::IndexerConfig;

    fn indexer() -> Indexer {
        Indexer::new(
            hive_db::open_memory().expect("open"),
            IndexerConfig::default(),
        )
    }

    const FEED: &str = r#"
{"num":1,"hash":"0000000100000000000000000000000000000000","timestamp":1600000000,"operations":[{"type":"account_create","value":{"name":"alice"}}]}

{"num":2,"hash":"0000000200000000000000000000000000000000","prev":"0000000100000000000000000000000000000000","timestamp":1600000003,"operations":[{"type":"comment","value":{"author":"alice","permlink":"foo","parent_permlink":"tag"}}]}
"#;

    #[test]
    fn test_mode_for() {
        assert_eq!(mode_for(100, 150, 60), SyncMode::Live);
        assert_eq!(mode_for(100, 161, 60), SyncMode::Initial);
        assert_eq!(mode_for(200, 150, 60), SyncMode::Live);
    }

    #[test]
    fn test_replay_and_rerun() {
        let mut indexer = indexer();
        let stop = AtomicBool::new(false);
        let stats = replay(&mut indexer, FEED.as_bytes(), 60, &stop).expect("replay");
        assert_eq!(
            stats,
            ReplayStats {
                applied: 2,
                skipped: 0,
                operations: 2
            }
        );
        // Old blocks are initial sync; finish() still ran the range jobs.
        let root: i64 = indexer
            .conn()
            .query_row("SELECT root_id FROM hive_posts", [], |row| row.get(0))
            .expect("root");
        assert_ne!(root, 0);

        let stats = replay(&mut indexer, FEED.as_bytes(), 60, &stop).expect("rerun");
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_stop_flag() {
        let mut indexer = indexer();
        let stop = AtomicBool::new(true);
        let stats = replay(&mut indexer, FEED.as_bytes(), 60, &stop).expect("replay");
        assert_eq!(stats.applied, 0);
    }

    #[test]
    fn test_bad_line_is_an_error() {
        let mut indexer = indexer();
        let stop = AtomicBool::new(false);
        assert!(replay(&mut indexer, "not a block\n".as_bytes(), 60, &stop).is_err());
    }
}
