//! Reblogs.
//!
//! Reblog operations are validated and applied to the feed cache at once,
//! but the `hive_reblogs` rows are collected in a [`ReblogBuffer`] and
//! written in batches at range boundaries.

use std::collections::HashSet;

use hive_db::queries::reblogs::{self, NewReblog, MAX_ROWS_PER_INSERT};
use hive_db::queries::{accounts, posts};
use hive_types::{NotifyType, PostId, SyncMode};
use rusqlite::Connection;
use serde::Deserialize;

use crate::notify::Notify;
use crate::{feed_cache, IndexerError, Result};

#[derive(Debug, Deserialize)]
struct ReblogPayload {
    account: String,
    author: String,
    permlink: String,
    #[serde(default)]
    delete: Option<String>,
}

/// Result of [`ReblogBuffer::process_reblog_op`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReblogOutcome {
    /// The reblog was queued and the blogger's feed updated.
    Buffered { post_id: PostId, blogger_id: i64 },
    /// A stored or queued reblog was removed.
    Deleted { post_id: PostId, blogger_id: i64 },
    /// The target post or the reblog to delete does not exist.
    NotFound,
    /// The operation was invalid and ignored.
    Rejected(&'static str),
}

#[derive(Debug, Clone)]
enum Change {
    Pushed,
    Removed { index: usize, row: NewReblog },
}

/// Reblogs waiting to be written.
///
/// The buffer is owned by the single writer; every mutation goes through
/// `&mut self`. Changes made while a block is being applied are journaled
/// so they can be undone together with the block's transaction.
#[derive(Debug, Default)]
pub struct ReblogBuffer {
    pending: Vec<NewReblog>,
    keys: HashSet<(i64, PostId)>,
    journal: Vec<Change>,
}

impl ReblogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued reblogs.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue a reblog; a (blogger, post) pair already queued is ignored.
    fn push(&mut self, row: NewReblog) -> bool {
        if !self.keys.insert((row.blogger_id, row.post_id)) {
            return false;
        }
        self.pending.push(row);
        self.journal.push(Change::Pushed);
        true
    }

    /// Drop a queued reblog.
    fn remove(&mut self, blogger_id: i64, post_id: PostId) -> bool {
        if !self.keys.remove(&(blogger_id, post_id)) {
            return false;
        }
        let Some(index) = self
            .pending
            .iter()
            .position(|r| r.blogger_id == blogger_id && r.post_id == post_id)
        else {
            return false;
        };
        let row = self.pending.remove(index);
        self.journal.push(Change::Removed { index, row });
        true
    }

    /// Drop every queued reblog of `post_id`. Returns entries dropped.
    pub fn discard_post(&mut self, post_id: PostId) -> usize {
        let bloggers: Vec<i64> = self
            .pending
            .iter()
            .filter(|r| r.post_id == post_id)
            .map(|r| r.blogger_id)
            .collect();
        bloggers
            .into_iter()
            .filter(|&blogger_id| self.remove(blogger_id, post_id))
            .count()
    }

    /// Keep every change made since the last commit or rollback.
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    /// Undo every change made since the last commit or rollback.
    pub fn rollback(&mut self) {
        while let Some(change) = self.journal.pop() {
            match change {
                Change::Pushed => {
                    if let Some(row) = self.pending.pop() {
                        self.keys.remove(&(row.blogger_id, row.post_id));
                    }
                }
                Change::Removed { index, row } => {
                    self.keys.insert((row.blogger_id, row.post_id));
                    self.pending.insert(index.min(self.pending.len()), row);
                }
            }
        }
    }

    /// Apply a reblog operation signed by `actor`.
    ///
    /// Outside initial sync a new reblog also notifies the post author,
    /// scored by the blogger's reputation rank. Deleting never notifies.
    pub fn process_reblog_op(
        &mut self,
        conn: &Connection,
        actor: &str,
        payload: &serde_json::Value,
        block_time: u64,
        block_num: u32,
        mode: SyncMode,
    ) -> Result<ReblogOutcome> {
        let Ok(op) = ReblogPayload::deserialize(payload) else {
            return Ok(reject("missing reblog fields"));
        };
        if op.account != actor {
            return Ok(reject("blogger is not the signer"));
        }
        let Some(blogger_id) = accounts::find_id(conn, &op.account)? else {
            return Ok(reject("unknown blogger"));
        };
        let Some(author_id) = accounts::find_id(conn, &op.author)? else {
            return Ok(reject("unknown author"));
        };

        let post = posts::find_live_by_name(conn, &op.author, &op.permlink)?
            .filter(|post| post.depth == 0);
        let Some(post) = post else {
            tracing::debug!(author = op.author, permlink = op.permlink, "reblog: post not found");
            return Ok(ReblogOutcome::NotFound);
        };

        if op.delete.as_deref() == Some("delete") {
            let stored = reblogs::delete(conn, blogger_id, post.id)?;
            let queued = self.remove(blogger_id, post.id);
            if !stored && !queued {
                tracing::debug!(blogger_id, post_id = post.id, "reblog: nothing to delete");
                return Ok(ReblogOutcome::NotFound);
            }
            feed_cache::delete(conn, post.id, blogger_id)?;
            return Ok(ReblogOutcome::Deleted {
                post_id: post.id,
                blogger_id,
            });
        }

        self.push(NewReblog {
            blogger_id,
            post_id: post.id,
            created_at: block_time,
            block_num,
        });
        feed_cache::insert(conn, post.id, blogger_id, block_time, block_num)?;
        if !mode.is_initial() {
            Notify {
                kind: NotifyType::Reblog,
                src_id: Some(blogger_id),
                dst_id: Some(author_id),
                post_id: Some(post.id),
                community_id: None,
                score: crate::accounts::default_score(conn, blogger_id)?,
                created_at: block_time,
                payload: None,
            }
            .write(conn, mode, block_num)?;
        }

        Ok(ReblogOutcome::Buffered {
            post_id: post.id,
            blogger_id,
        })
    }

    /// Write every queued reblog in one transaction, at most
    /// [`MAX_ROWS_PER_INSERT`] rows per statement. Pairs already stored are
    /// ignored.
    ///
    /// Returns the number of queued rows drained. On failure nothing is
    /// written and the queue is kept, so the whole batch can be retried.
    pub fn flush(&mut self, conn: &mut Connection) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let pending = self.pending.len();
        let written = self
            .write_all(conn)
            .map_err(|source| IndexerError::BatchFailure { pending, source })?;

        self.pending.clear();
        self.keys.clear();
        self.journal.clear();
        tracing::debug!(pending, written, "reblogs flushed");
        Ok(pending)
    }

    fn write_all(&self, conn: &mut Connection) -> hive_db::Result<usize> {
        let tx = conn.transaction()?;
        let mut written = 0;
        for chunk in self.pending.chunks(MAX_ROWS_PER_INSERT) {
            written += reblogs::insert_chunk(&tx, chunk)?;
        }
        tx.commit()?;
        Ok(written)
    }
}

fn reject(reason: &'static str) -> ReblogOutcome {
    tracing::debug!(reason, "reblog op rejected");
    ReblogOutcome::Rejected(reason)
}
