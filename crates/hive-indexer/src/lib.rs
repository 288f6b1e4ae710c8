//! # hive-indexer
//!
//! Block-driven state maintenance for the hive mirror.
//!
//! Operations are applied one block at a time, each block inside a single
//! transaction. Derived data is maintained in two ways:
//!
//! - inline, per operation: scores, feed cache entries, persisted
//!   notifications, follow counts;
//! - in batch jobs at block-range boundaries: root id backfill, children
//!   recount, reblog flush, reputation rank refresh.
//!
//! ## Modules
//!
//! - [`blocks`] — the [`Indexer`]: chain-link checks, operation dispatch, range jobs.
//! - [`posts`] — post lifecycle (create, edit, soft delete).
//! - [`tree`] — root id backfill and children recount.
//! - [`reblog`] — reblog validation, buffering and flush.
//! - [`feed_cache`] — per-account blog index.
//! - [`notify`] — persisted notifications and notification reads.
//! - [`votes`], [`follows`], [`accounts`], [`communities`] — the remaining handlers.

pub mod accounts;
pub mod blocks;
pub mod communities;
pub mod config;
pub mod feed_cache;
pub mod follows;
pub mod notify;
pub mod posts;
pub mod reblog;
pub mod tree;
pub mod votes;

pub use blocks::{BlockOutcome, Indexer};
pub use config::IndexerConfig;
pub use reblog::{ReblogBuffer, ReblogOutcome};

/// Errors raised while applying blocks.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// Storage failure.
    #[error("database error: {0}")]
    Db(#[from] hive_db::DbError),

    /// The feed broke its ordering contract (missing parent, unknown post,
    /// broken chain link). The block is rolled back and must not be retried.
    #[error("inconsistent feed: {0}")]
    Inconsistency(String),

    /// A reblog flush failed; the pending rows are kept for a retry of the
    /// whole batch.
    #[error("reblog flush failed with {pending} pending rows: {source}")]
    BatchFailure {
        pending: usize,
        #[source]
        source: hive_db::DbError,
    },

    /// An operation payload could not be decoded.
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl From<rusqlite::Error> for IndexerError {
    fn from(e: rusqlite::Error) -> Self {
        IndexerError::Db(hive_db::DbError::Sqlite(e))
    }
}

impl From<hive_types::TypeError> for IndexerError {
    fn from(e: hive_types::TypeError) -> Self {
        IndexerError::Payload(e.to_string())
    }
}

/// Convenience result type for indexer operations.
pub type Result<T> = std::result::Result<T, IndexerError>;
