//! # hive-db
//!
//! Storage layer of the hive state mirror.
//! Manages one SQLite database holding the mirrored chain state.
//!
//! ## Schema
//!
//! - WAL mode, foreign keys enforced
//! - All timestamps are Unix epoch seconds
//! - Schema version stored in `PRAGMA user_version`
//! - Scoring functions are registered as SQL scalar functions on every
//!   connection, so the derived views compute with the same code as the
//!   indexer

pub mod functions;
pub mod migrations;
pub mod queries;
pub mod schema;

use rusqlite::Connection;
use std::path::Path;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the database at the given path.
///
/// Configures WAL mode, foreign keys, scalar functions, and runs any pending
/// migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Configure SQLite pragmas and register scalar functions.
fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -64000;",
    )?;
    functions::register(conn)?;
    Ok(())
}

/// Map `QueryReturnedNoRows` to `None`.
pub(crate) fn optional<T>(result: rusqlite::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::Sqlite(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = open_memory().expect("open in-memory db");
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("get user_version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_memory().expect("open");
        let fk: i32 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("get foreign_keys");
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_open_file() {
        let path = std::env::temp_dir().join(format!("hive-db-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let conn = open(&path).expect("open file db");
            let mode: String = conn
                .pragma_query_value(None, "journal_mode", |row| row.get(0))
                .expect("get journal_mode");
            assert_eq!(mode, "wal");
        }
        // Reopening runs no migration.
        open(&path).expect("reopen");
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
