//! hive-sync: replays a block feed into the hive state mirror.
//!
//! Single OS process running a Tokio runtime. Blocks are applied on a
//! blocking task by the single writer; Ctrl-C stops the replay after the
//! current block and runs the pending batch jobs before exit.

mod config;
mod feed;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hive_indexer::Indexer;
use tracing::{error, info};

use crate::config::SyncConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = SyncConfig::load()?;

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("hive={}", config.logging.log_level).parse()?),
        )
        .init();

    info!("hive-sync starting");

    let db_path = config.db_path();
    let feed_path = config.feed_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 3. Replay on the single writer
    let stop = Arc::new(AtomicBool::new(false));
    let mut task = tokio::task::spawn_blocking({
        let stop = stop.clone();
        let indexer_config = config.indexer.clone();
        let live_lag_secs = config.sync.live_lag_secs;
        move || -> anyhow::Result<feed::ReplayStats> {
            let conn = hive_db::open(&db_path)?;
            let mut indexer = Indexer::new(conn, indexer_config);
            if let Some(head) = indexer.head()? {
                info!(head, "resuming from stored head");
            }
            info!("Replaying block feed {:?}", feed_path);
            feed::replay_file(&mut indexer, &feed_path, live_lag_secs, &stop)
        }
    });

    // 4. Run until the feed ends or Ctrl-C
    let result = tokio::select! {
        result = &mut task => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, stopping after the current block");
            stop.store(true, Ordering::SeqCst);
            task.await
        }
    };

    match result? {
        Ok(stats) => {
            info!(
                applied = stats.applied,
                skipped = stats.skipped,
                operations = stats.operations,
                "hive-sync stopped"
            );
            Ok(())
        }
        Err(e) => {
            error!("Replay failed: {:#}", e);
            Err(e)
        }
    }
}
