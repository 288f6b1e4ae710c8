//! Community and subscription queries.
//!
//! A community shares its id with the account of the same name.

use rusqlite::Connection;

use crate::{optional, Result};

/// Register a community for an existing account. Idempotent.
pub fn insert(
    conn: &Connection,
    account_id: i64,
    name: &str,
    created_at: u64,
    block_num: u32,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO hive_communities (id, name, created_at, block_num)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![account_id, name, created_at as i64, block_num],
    )?;
    Ok(inserted > 0)
}

/// Look up a community id by name.
pub fn find_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    optional(conn.query_row(
        "SELECT id FROM hive_communities WHERE name = ?1",
        [name],
        |row| row.get(0),
    ))
}

/// Subscribe an account. Returns `true` when a new subscription was made.
pub fn subscribe(
    conn: &Connection,
    account_id: i64,
    community_id: i64,
    created_at: u64,
    block_num: u32,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO hive_subscriptions (account_id, community_id, created_at, block_num)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![account_id, community_id, created_at as i64, block_num],
    )?;
    if inserted > 0 {
        conn.execute(
            "UPDATE hive_communities SET subscribers = subscribers + 1 WHERE id = ?1",
            [community_id],
        )?;
    }
    Ok(inserted > 0)
}

/// Unsubscribe an account. Returns `true` when a subscription was removed.
pub fn unsubscribe(conn: &Connection, account_id: i64, community_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM hive_subscriptions WHERE account_id = ?1 AND community_id = ?2",
        [account_id, community_id],
    )?;
    if deleted > 0 {
        conn.execute(
            "UPDATE hive_communities SET subscribers = subscribers - 1 WHERE id = ?1",
            [community_id],
        )?;
    }
    Ok(deleted > 0)
}

/// Current subscriber count.
pub fn subscribers(conn: &Connection, community_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT subscribers FROM hive_communities WHERE id = ?1",
        [community_id],
        |row| row.get(0),
    )?)
}
