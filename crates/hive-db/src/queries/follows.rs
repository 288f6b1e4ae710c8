//! Follow edge queries.

use hive_types::FollowState;
use rusqlite::Connection;

use crate::{optional, DbError, Result};

/// Get the edge follower → following, if one was ever recorded.
pub fn get(conn: &Connection, follower: i64, following: i64) -> Result<Option<FollowRow>> {
    let row = optional(conn.query_row(
        "SELECT id, follower, following, state, blacklisted, follow_blacklists, created_at, block_num
         FROM hive_follows WHERE follower = ?1 AND following = ?2",
        [follower, following],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
            ))
        },
    ))?;

    row.map(
        |(id, follower, following, state, blacklisted, follow_blacklists, created_at, block_num)| {
            Ok(FollowRow {
                id,
                follower,
                following,
                state: FollowState::try_from(state)
                    .map_err(|e| DbError::Serialization(e.to_string()))?,
                blacklisted,
                follow_blacklists,
                created_at: created_at as u64,
                block_num: block_num as u32,
            })
        },
    )
    .transpose()
}

/// Write the full state of an edge.
///
/// `created_at`/`block_num` are only moved when the edge enters the follow
/// state, so a follow notification carries the block of the latest follow.
pub fn upsert(conn: &Connection, edge: &FollowRow) -> Result<()> {
    conn.execute(
        "INSERT INTO hive_follows
         (follower, following, state, blacklisted, follow_blacklists, created_at, block_num)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (following, follower) DO UPDATE SET
             state = excluded.state,
             blacklisted = excluded.blacklisted,
             follow_blacklists = excluded.follow_blacklists,
             created_at = CASE WHEN excluded.state = 1 AND hive_follows.state != 1
                               THEN excluded.created_at ELSE hive_follows.created_at END,
             block_num = CASE WHEN excluded.state = 1 AND hive_follows.state != 1
                              THEN excluded.block_num ELSE hive_follows.block_num END",
        rusqlite::params![
            edge.follower,
            edge.following,
            edge.state.as_i64(),
            edge.blacklisted,
            edge.follow_blacklists,
            edge.created_at as i64,
            edge.block_num,
        ],
    )?;
    Ok(())
}

/// Whether `account` has muted `target`.
pub fn is_muted(conn: &Connection, account: i64, target: i64) -> Result<bool> {
    Ok(get(conn, account, target)?.is_some_and(|edge| edge.state == FollowState::Mute))
}

/// A follow edge.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowRow {
    pub id: i64,
    pub follower: i64,
    pub following: i64,
    pub state: FollowState,
    pub blacklisted: bool,
    pub follow_blacklists: bool,
    pub created_at: u64,
    pub block_num: u32,
}

impl FollowRow {
    /// A fresh edge with no state.
    pub fn new(follower: i64, following: i64, created_at: u64, block_num: u32) -> Self {
        Self {
            id: 0,
            follower,
            following,
            state: FollowState::None,
            blacklisted: false,
            follow_blacklists: false,
            created_at,
            block_num,
        }
    }
}
