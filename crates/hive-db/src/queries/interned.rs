//! Interned string tables: permlinks and categories.
//!
//! Both map a string to a stable id. Interning is idempotent; an existing
//! string keeps its id.

use rusqlite::Connection;

use crate::{optional, DbError, Result};

/// Intern a permlink, returning its id.
pub fn intern_permlink(conn: &Connection, permlink: &str) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO hive_permlink_data (permlink) VALUES (?1)",
        [permlink],
    )?;
    conn.query_row(
        "SELECT id FROM hive_permlink_data WHERE permlink = ?1",
        [permlink],
        |row| row.get(0),
    )
    .map_err(DbError::Sqlite)
}

/// Look up a permlink id without creating it.
pub fn find_permlink(conn: &Connection, permlink: &str) -> Result<Option<i64>> {
    optional(conn.query_row(
        "SELECT id FROM hive_permlink_data WHERE permlink = ?1",
        [permlink],
        |row| row.get(0),
    ))
}

/// Intern a category, returning its id.
pub fn intern_category(conn: &Connection, category: &str) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO hive_category_data (category) VALUES (?1)",
        [category],
    )?;
    conn.query_row(
        "SELECT id FROM hive_category_data WHERE category = ?1",
        [category],
        |row| row.get(0),
    )
    .map_err(DbError::Sqlite)
}

/// Resolve a category id back to its name.
pub fn category_name(conn: &Connection, id: i64) -> Result<String> {
    conn.query_row(
        "SELECT category FROM hive_category_data WHERE id = ?1",
        [id],
        |row| row.get(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("category {id}")),
        other => DbError::Sqlite(other),
    })
}
