//! Vote query functions.

use rusqlite::Connection;
use serde::Serialize;

use crate::{optional, Result};

/// A vote as applied by the indexer.
#[derive(Debug, Clone)]
pub struct VoteUpsert {
    pub post_id: i64,
    pub voter_id: i64,
    pub author_id: i64,
    pub permlink_id: i64,
    pub vote_percent: i32,
    /// `None` for a vote whose weight is not known yet; such a vote keeps
    /// any rshares stored before.
    pub rshares: Option<i64>,
    pub last_update: u64,
    pub block_num: u32,
}

/// Previous state of a vote row, as seen by [`upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousVote {
    /// Post the vote was on. Differs from the new post id when the post was
    /// deleted and re-created under the same permlink.
    pub post_id: i64,
    pub rshares: i64,
    pub is_effective: bool,
}

/// Insert a vote or update the existing one for (voter, author, permlink).
///
/// A revote replaces rshares/percent and bumps `num_changes`; re-applying
/// the same vote from the same block changes nothing. A row left on an
/// earlier incarnation of the post moves to the new post as a first vote.
/// Returns the previous state, `None` for a first vote.
pub fn upsert(conn: &Connection, vote: &VoteUpsert) -> Result<Option<PreviousVote>> {
    let previous = optional(conn.query_row(
        "SELECT post_id, rshares, is_effective FROM hive_votes
         WHERE voter_id = ?1 AND author_id = ?2 AND permlink_id = ?3",
        [vote.voter_id, vote.author_id, vote.permlink_id],
        |row| {
            Ok(PreviousVote {
                post_id: row.get(0)?,
                rshares: row.get(1)?,
                is_effective: row.get(2)?,
            })
        },
    ))?;

    conn.execute(
        "INSERT INTO hive_votes
         (post_id, voter_id, author_id, permlink_id, rshares, vote_percent,
          is_effective, last_update, block_num)
         VALUES (?1, ?2, ?3, ?4, COALESCE(?5, 0), ?6, ?7, ?8, ?9)
         ON CONFLICT (voter_id, author_id, permlink_id) DO UPDATE SET
             post_id = excluded.post_id,
             rshares = CASE
                 WHEN hive_votes.post_id != excluded.post_id THEN excluded.rshares
                 ELSE COALESCE(?5, hive_votes.rshares)
             END,
             vote_percent = excluded.vote_percent,
             is_effective = CASE
                 WHEN hive_votes.post_id != excluded.post_id THEN excluded.is_effective
                 ELSE excluded.is_effective OR hive_votes.is_effective
             END,
             last_update = excluded.last_update,
             num_changes = CASE
                 WHEN hive_votes.post_id != excluded.post_id THEN 0
                 WHEN hive_votes.block_num = excluded.block_num
                  AND hive_votes.vote_percent = excluded.vote_percent
                  AND hive_votes.last_update = excluded.last_update
                     THEN hive_votes.num_changes
                 ELSE hive_votes.num_changes + 1
             END,
             block_num = excluded.block_num",
        rusqlite::params![
            vote.post_id,
            vote.voter_id,
            vote.author_id,
            vote.permlink_id,
            vote.rshares,
            vote.vote_percent,
            vote.rshares.is_some(),
            vote.last_update as i64,
            vote.block_num,
        ],
    )?;

    Ok(previous)
}

/// Votes on a post ordered by voter id, starting after `start_voter`.
pub fn list_by_post(
    conn: &Connection,
    post_id: i64,
    start_voter: Option<i64>,
    limit: u32,
) -> Result<Vec<VoteRow>> {
    let mut stmt = conn.prepare(
        "SELECT hv.id, hv.post_id, hv.voter_id, ha.name, hv.rshares, hv.vote_percent,
                hv.is_effective, hv.last_update, hv.num_changes
         FROM hive_votes hv
         JOIN hive_accounts ha ON ha.id = hv.voter_id
         WHERE hv.post_id = ?1 AND hv.voter_id > ?2
         ORDER BY hv.voter_id
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(
            rusqlite::params![post_id, start_voter.unwrap_or(0), limit],
            map_vote,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Votes cast by one account ordered by post id, starting after `start_post`.
pub fn list_by_voter(
    conn: &Connection,
    voter_id: i64,
    start_post: Option<i64>,
    limit: u32,
) -> Result<Vec<VoteRow>> {
    let mut stmt = conn.prepare(
        "SELECT hv.id, hv.post_id, hv.voter_id, ha.name, hv.rshares, hv.vote_percent,
                hv.is_effective, hv.last_update, hv.num_changes
         FROM hive_votes hv
         JOIN hive_accounts ha ON ha.id = hv.voter_id
         WHERE hv.voter_id = ?1 AND hv.post_id > ?2
         ORDER BY hv.post_id
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(
            rusqlite::params![voter_id, start_post.unwrap_or(0), limit],
            map_vote,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_vote(row: &rusqlite::Row<'_>) -> rusqlite::Result<VoteRow> {
    Ok(VoteRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        voter_id: row.get(2)?,
        voter: row.get(3)?,
        rshares: row.get(4)?,
        vote_percent: row.get(5)?,
        is_effective: row.get(6)?,
        last_update: row.get::<_, i64>(7)? as u64,
        num_changes: row.get(8)?,
    })
}

/// A vote row with the voter's name.
#[derive(Debug, Clone, Serialize)]
pub struct VoteRow {
    pub id: i64,
    pub post_id: i64,
    pub voter_id: i64,
    pub voter: String,
    pub rshares: i64,
    pub vote_percent: i32,
    pub is_effective: bool,
    pub last_update: u64,
    pub num_changes: i64,
}
