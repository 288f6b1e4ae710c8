//! Per-account blog index: an account's own root posts plus its reblogs,
//! newest first.

use rusqlite::Connection;
use serde::Serialize;

use crate::Result;

/// Add (account, post). Idempotent: an existing entry keeps its timestamp.
pub fn insert(
    conn: &Connection,
    post_id: i64,
    account_id: i64,
    created_at: u64,
    block_num: u32,
) -> Result<()> {
    conn.execute(
        "INSERT INTO hive_feed_cache (post_id, account_id, created_at, block_num)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (account_id, post_id) DO NOTHING",
        rusqlite::params![post_id, account_id, created_at as i64, block_num],
    )?;
    Ok(())
}

/// Remove (account, post) if present.
pub fn delete(conn: &Connection, post_id: i64, account_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM hive_feed_cache WHERE post_id = ?1 AND account_id = ?2",
        [post_id, account_id],
    )?;
    Ok(deleted > 0)
}

/// Remove a post from every account's feed.
pub fn delete_for_post(conn: &Connection, post_id: i64) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM hive_feed_cache WHERE post_id = ?1",
        [post_id],
    )?)
}

/// One feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub post_id: i64,
    pub created_at: u64,
    pub block_num: u32,
}

/// List an account's feed, newest first.
///
/// `before` is the (created_at, post_id) of the last entry already seen.
pub fn list_by_account(
    conn: &Connection,
    account_id: i64,
    before: Option<(u64, i64)>,
    limit: u32,
) -> Result<Vec<FeedEntry>> {
    let (before_ts, before_post) = before
        .map(|(ts, post)| (ts as i64, post))
        .unwrap_or((i64::MAX, i64::MAX));
    let mut stmt = conn.prepare(
        "SELECT post_id, created_at, block_num FROM hive_feed_cache
         WHERE account_id = ?1 AND (created_at, post_id) < (?2, ?3)
         ORDER BY created_at DESC, post_id DESC
         LIMIT ?4",
    )?;
    let rows = stmt
        .query_map(
            rusqlite::params![account_id, before_ts, before_post, limit],
            |row| {
                Ok(FeedEntry {
                    post_id: row.get(0)?,
                    created_at: row.get::<_, i64>(1)? as u64,
                    block_num: row.get::<_, i64>(2)? as u32,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
