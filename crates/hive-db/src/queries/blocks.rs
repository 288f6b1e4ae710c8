//! Block chain queries.

use rusqlite::Connection;

use crate::{optional, Result};

/// Append a block row.
pub fn insert(
    conn: &Connection,
    num: u32,
    hash: &str,
    prev: Option<&str>,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO hive_blocks (num, hash, prev, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![num, hash, prev, created_at as i64],
    )?;
    Ok(())
}

/// Highest stored block as (num, hash).
pub fn head(conn: &Connection) -> Result<Option<(u32, String)>> {
    optional(conn.query_row(
        "SELECT num, hash FROM hive_blocks ORDER BY num DESC LIMIT 1",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    ))
}

/// Number of the head block, 0 on an empty chain.
pub fn head_num(conn: &Connection) -> Result<u32> {
    Ok(head(conn)?.map(|(num, _)| num).unwrap_or(0))
}

/// Hash of a stored block.
pub fn hash_of(conn: &Connection, num: u32) -> Result<Option<String>> {
    optional(conn.query_row(
        "SELECT hash FROM hive_blocks WHERE num = ?1",
        [num],
        |row| row.get(0),
    ))
}
