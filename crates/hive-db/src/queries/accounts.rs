//! Account queries.

use rusqlite::Connection;
use serde::Serialize;

use crate::{optional, DbError, Result};

/// Insert an account unless the name is already taken.
///
/// Returns `true` when a row was created.
pub fn insert(conn: &Connection, name: &str, created_at: u64, block_num: u32) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO hive_accounts (name, created_at, block_num) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, created_at as i64, block_num],
    )?;
    Ok(inserted > 0)
}

/// Look up an account id by name.
pub fn find_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    optional(conn.query_row(
        "SELECT id FROM hive_accounts WHERE name = ?1",
        [name],
        |row| row.get(0),
    ))
}

/// Get an account by id.
pub fn get(conn: &Connection, id: i64) -> Result<AccountRow> {
    conn.query_row(
        "SELECT id, name, created_at, reputation, followers, following, rank
         FROM hive_accounts WHERE id = ?1",
        [id],
        |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get::<_, i64>(2)? as u64,
                reputation: row.get(3)?,
                followers: row.get(4)?,
                following: row.get(5)?,
                rank: row.get(6)?,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("account {id}")),
        other => DbError::Sqlite(other),
    })
}

/// Set an account's reputation. Returns `false` for an unknown account.
pub fn set_reputation(conn: &Connection, name: &str, reputation: f64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE hive_accounts SET reputation = ?1 WHERE name = ?2",
        rusqlite::params![reputation, name],
    )?;
    Ok(updated > 0)
}

/// Reputation rank of one account (1 = highest reputation, ties share a rank).
pub fn rank_position(conn: &Connection, id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) + 1 FROM hive_accounts
         WHERE reputation > (SELECT reputation FROM hive_accounts WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )
    .map_err(DbError::Sqlite)
}

/// Recompute the stored `rank` of every account. Returns rows changed.
pub fn update_ranks(conn: &Connection) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE hive_accounts
         SET rank = ranked.position
         FROM (
             SELECT id, RANK() OVER (ORDER BY reputation DESC) AS position
             FROM hive_accounts
         ) AS ranked
         WHERE hive_accounts.id = ranked.id AND hive_accounts.rank != ranked.position",
        [],
    )?;
    Ok(updated)
}

/// Add `delta` to the follower count of `following_id` and the following
/// count of `follower_id`.
pub fn adjust_follow_counts(
    conn: &Connection,
    follower_id: i64,
    following_id: i64,
    delta: i64,
) -> Result<()> {
    conn.execute(
        "UPDATE hive_accounts SET following = following + ?1 WHERE id = ?2",
        rusqlite::params![delta, follower_id],
    )?;
    conn.execute(
        "UPDATE hive_accounts SET followers = followers + ?1 WHERE id = ?2",
        rusqlite::params![delta, following_id],
    )?;
    Ok(())
}

/// A raw account row.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub created_at: u64,
    pub reputation: f64,
    pub followers: i64,
    pub following: i64,
    pub rank: i64,
}
