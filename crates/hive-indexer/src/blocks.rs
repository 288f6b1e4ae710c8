//! Block processor.
//!
//! The [`Indexer`] is the single writer of the store. Each block is checked
//! against the stored chain head, then all of its operations are applied in
//! order inside one transaction. Batch jobs run whenever a block range
//! closes:
//!
//! 1. root id backfill and children recount for the range,
//! 2. reblog flush,
//! 3. reputation rank refresh, every `rank_refresh_interval` blocks.

use std::ops::RangeInclusive;

use hive_db::queries::blocks;
use hive_types::operation::split_custom_json;
use hive_types::{Block, Operation, SyncMode};
use rusqlite::Connection;

use crate::communities::process_community_op;
use crate::follows::process_follow_op;
use crate::posts::{self, CommentOp};
use crate::votes::{self, VoteOp};
use crate::{accounts, tree, IndexerConfig, IndexerError, ReblogBuffer, Result};

/// What [`Indexer::process_block`] did with a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The block was applied with this many operations.
    Applied { operations: usize },
    /// The block is already stored with the same hash; nothing was done.
    AlreadyApplied,
}

/// Applies blocks to the store.
pub struct Indexer {
    conn: Connection,
    config: IndexerConfig,
    reblogs: ReblogBuffer,
    /// First block of the range whose batch jobs have not run yet.
    range_start: Option<u32>,
    /// Mode of the previous block applied in this session.
    mode: Option<SyncMode>,
    last_rank_refresh: u32,
}

impl Indexer {
    pub fn new(conn: Connection, config: IndexerConfig) -> Self {
        Self {
            conn,
            config,
            reblogs: ReblogBuffer::new(),
            range_start: None,
            mode: None,
            last_rank_refresh: 0,
        }
    }

    /// Read access to the store.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Reblogs queued and not yet written.
    pub fn pending_reblogs(&self) -> usize {
        self.reblogs.len()
    }

    /// Stored chain head, if any block was applied.
    pub fn head(&self) -> Result<Option<u32>> {
        Ok(blocks::head(&self.conn)?.map(|(num, _)| num))
    }

    /// Apply one block.
    ///
    /// The block must extend the stored head: `num = head + 1` and
    /// `prev = head hash`. A block that is already stored under the same
    /// hash is skipped. Any error rolls back every write of the block.
    pub fn process_block(&mut self, block: &Block, mode: SyncMode) -> Result<BlockOutcome> {
        if hex::decode(&block.hash).is_err() {
            return Err(IndexerError::Inconsistency(format!(
                "block {} has a malformed hash {}",
                block.num, block.hash
            )));
        }

        let head = blocks::head(&self.conn)?;
        if let Some((head_num, head_hash)) = &head {
            if block.num <= *head_num {
                return match blocks::hash_of(&self.conn, block.num)? {
                    Some(hash) if hash == block.hash => {
                        tracing::debug!(num = block.num, "block already applied");
                        Ok(BlockOutcome::AlreadyApplied)
                    }
                    _ => Err(IndexerError::Inconsistency(format!(
                        "block {} conflicts with stored chain at head {head_num}",
                        block.num
                    ))),
                };
            }
            if block.num != head_num + 1 {
                return Err(IndexerError::Inconsistency(format!(
                    "block {} does not follow head {head_num}",
                    block.num
                )));
            }
            if block.prev.as_deref() != Some(head_hash.as_str()) {
                return Err(IndexerError::Inconsistency(format!(
                    "block {} does not link to head hash {head_hash}",
                    block.num
                )));
            }
        }

        if self.mode == Some(SyncMode::Initial) && mode == SyncMode::Live {
            self.close_range()?;
            self.rebuild_derived()?;
            tracing::info!(num = block.num, "initial sync finished, switching to live");
        }
        self.mode = Some(mode);

        let prev = head.as_ref().and(block.prev.as_deref());
        let tx = self.conn.transaction()?;
        let applied = block
            .operations
            .iter()
            .try_for_each(|op| apply_operation(&tx, &mut self.reblogs, &self.config, block, mode, op))
            .and_then(|()| {
                blocks::insert(&tx, block.num, &block.hash, prev, block.timestamp)?;
                Ok(())
            });
        match applied {
            Ok(()) => {
                tx.commit()?;
                self.reblogs.commit();
            }
            Err(e) => {
                drop(tx);
                self.reblogs.rollback();
                tracing::error!(num = block.num, error = %e, "block rolled back");
                return Err(e);
            }
        }

        let start = *self.range_start.get_or_insert(block.num);
        if block.num - start + 1 >= self.config.flush_interval(mode) {
            self.close_range()?;
        }

        if block.num.saturating_sub(self.last_rank_refresh) >= self.config.rank_refresh_interval {
            accounts::refresh_ranks(&self.conn)?;
            self.last_rank_refresh = block.num;
        }

        Ok(BlockOutcome::Applied {
            operations: block.operations.len(),
        })
    }

    /// Run the batch jobs of the open range and write queued reblogs.
    pub fn finish(&mut self) -> Result<()> {
        self.close_range()?;
        self.reblogs.flush(&mut self.conn)?;
        Ok(())
    }

    /// Run the whole-table tree jobs and a rank refresh.
    pub fn rebuild_derived(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        let roots = tree::backfill_root_ids(&tx, None)?;
        let parents = tree::recompute_children_counts(&tx, None)?;
        let ranks = accounts::refresh_ranks(&tx)?;
        tx.commit()?;
        tracing::info!(roots, parents, ranks, "derived data rebuilt");
        Ok(())
    }

    fn close_range(&mut self) -> Result<()> {
        let Some(first) = self.range_start.take() else {
            return Ok(());
        };
        let last = blocks::head_num(&self.conn)?;
        self.run_range_jobs(first..=last)
    }

    fn run_range_jobs(&mut self, range: RangeInclusive<u32>) -> Result<()> {
        let tx = self.conn.transaction()?;
        let roots = tree::backfill_root_ids(&tx, Some(&range))?;
        let parents = tree::recompute_children_counts(&tx, Some(&range))?;
        tx.commit()?;
        let reblogs = self.reblogs.flush(&mut self.conn)?;

        if self.mode.is_some_and(SyncMode::is_initial) {
            tracing::info!(
                first = range.start(),
                last = range.end(),
                roots,
                parents,
                reblogs,
                "range flushed"
            );
        } else {
            tracing::debug!(
                first = range.start(),
                last = range.end(),
                roots,
                parents,
                reblogs,
                "range flushed"
            );
        }
        Ok(())
    }
}

fn apply_operation(
    conn: &Connection,
    reblogs: &mut ReblogBuffer,
    config: &IndexerConfig,
    block: &Block,
    mode: SyncMode,
    op: &Operation,
) -> Result<()> {
    tracing::trace!(num = block.num, kind = op.kind(), "operation");
    let (time, num) = (block.timestamp, block.num);
    match op {
        Operation::AccountCreate { name } => {
            accounts::register(conn, name, time, num)?;
        }
        Operation::Comment {
            author,
            permlink,
            parent_author,
            parent_permlink,
        } => {
            let op = CommentOp {
                author,
                permlink,
                parent_author,
                parent_permlink,
            };
            posts::upsert_post(conn, &op, time, num, config.community_cutoff)?;
        }
        Operation::DeleteComment { author, permlink } => {
            if let Some((post_id, 0)) = posts::delete_post(conn, author, permlink, num)? {
                reblogs.discard_post(post_id);
            }
        }
        Operation::Vote {
            voter,
            author,
            permlink,
            weight,
            rshares,
        } => {
            let op = VoteOp {
                voter,
                author,
                permlink,
                weight: *weight,
                rshares: *rshares,
            };
            votes::process_vote(conn, &op, time, num)?;
        }
        Operation::CommentPayoutUpdate {
            author,
            permlink,
            payout,
            pending_payout,
            is_paidout,
        } => {
            posts::update_payout(conn, author, permlink, *payout, *pending_payout, *is_paidout)?;
        }
        Operation::AccountReputation {
            account,
            reputation,
        } => {
            accounts::update_reputation(conn, account, *reputation)?;
        }
        Operation::CustomJson {
            id,
            required_posting_auths,
            json,
        } => {
            apply_custom_json(conn, reblogs, block, mode, id, required_posting_auths, json)?;
        }
    }
    Ok(())
}

fn apply_custom_json(
    conn: &Connection,
    reblogs: &mut ReblogBuffer,
    block: &Block,
    mode: SyncMode,
    id: &str,
    auths: &[String],
    json: &str,
) -> Result<()> {
    let default_action = match id {
        "follow" => "follow",
        "community" => "subscribe",
        _ => {
            tracing::trace!(id, "custom_json ignored");
            return Ok(());
        }
    };
    let Some(actor) = auths.first() else {
        tracing::warn!(id, num = block.num, "custom_json without posting auth ignored");
        return Ok(());
    };
    let (action, payload) = match split_custom_json(json, default_action) {
        Ok(split) => split,
        Err(e) => {
            tracing::warn!(id, num = block.num, error = %e, "malformed custom_json ignored");
            return Ok(());
        }
    };

    let (time, num) = (block.timestamp, block.num);
    match (id, action.as_str()) {
        ("follow", "follow") => {
            process_follow_op(conn, actor, &payload, time, num)?;
        }
        ("follow", "reblog") => {
            reblogs.process_reblog_op(conn, actor, &payload, time, num, mode)?;
        }
        ("community", action) => {
            process_community_op(conn, actor, action, &payload, time, num)?;
        }
        (id, action) => tracing::debug!(id, action, "unsupported custom_json action"),
    }
    Ok(())
}
