//! Reblog query functions.

use rusqlite::Connection;

use crate::{optional, Result};

/// Largest number of rows written by one INSERT statement.
pub const MAX_ROWS_PER_INSERT: usize = 1000;

/// A reblog waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewReblog {
    pub blogger_id: i64,
    pub post_id: i64,
    pub created_at: u64,
    pub block_num: u32,
}

/// Insert a batch of reblogs with one statement, ignoring pairs that
/// already exist. Returns the number of rows created.
///
/// Callers split batches at [`MAX_ROWS_PER_INSERT`].
pub fn insert_chunk(conn: &Connection, rows: &[NewReblog]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    let values = vec!["(?, ?, ?, ?)"; rows.len()].join(", ");
    let sql = format!(
        "INSERT INTO hive_reblogs (blogger_id, post_id, created_at, block_num)
         VALUES {values}
         ON CONFLICT (blogger_id, post_id) DO NOTHING"
    );
    let params = rows.iter().flat_map(|r| {
        [
            r.blogger_id,
            r.post_id,
            r.created_at as i64,
            i64::from(r.block_num),
        ]
    });
    let inserted = conn.execute(&sql, rusqlite::params_from_iter(params))?;
    Ok(inserted)
}

/// Whether (blogger, post) is stored.
pub fn exists(conn: &Connection, blogger_id: i64, post_id: i64) -> Result<bool> {
    let found = optional(conn.query_row(
        "SELECT 1 FROM hive_reblogs WHERE blogger_id = ?1 AND post_id = ?2",
        [blogger_id, post_id],
        |row| row.get::<_, i64>(0),
    ))?;
    Ok(found.is_some())
}

/// Delete (blogger, post). Returns `true` when a row was removed.
pub fn delete(conn: &Connection, blogger_id: i64, post_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM hive_reblogs WHERE blogger_id = ?1 AND post_id = ?2",
        [blogger_id, post_id],
    )?;
    Ok(deleted > 0)
}

/// Delete every reblog of a post. Returns rows removed.
pub fn delete_for_post(conn: &Connection, post_id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM hive_reblogs WHERE post_id = ?1", [post_id])?;
    Ok(deleted)
}

/// Number of accounts that reblogged a post.
pub fn count_for_post(conn: &Connection, post_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM hive_reblogs WHERE post_id = ?1",
        [post_id],
        |row| row.get(0),
    )?)
}
