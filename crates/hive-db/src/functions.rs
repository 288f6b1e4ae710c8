//! SQL scalar functions backed by the Rust scoring code.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::Result;

/// Register `notification_id`, `reputation_bucket` and `notify_vote_score`.
pub fn register(conn: &Connection) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("notification_id", 3, flags, |ctx| {
        let block_num: u32 = ctx.get(0)?;
        let type_id: u8 = ctx.get(1)?;
        let source_id: i64 = ctx.get(2)?;
        Ok(hive_types::notification_id(block_num, type_id, source_id))
    })?;

    conn.create_scalar_function("reputation_bucket", 1, flags, |ctx| {
        let rank: i64 = ctx.get(0)?;
        Ok(hive_scoring::reputation_bucket(rank))
    })?;

    conn.create_scalar_function("notify_vote_score", 3, flags, |ctx| {
        let payout: f64 = ctx.get(0)?;
        let abs_rshares: i64 = ctx.get(1)?;
        let vote_rshares: i64 = ctx.get(2)?;
        Ok(hive_scoring::notify_vote_score(payout, abs_rshares, vote_rshares))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        register(&conn).expect("register");
        conn
    }

    #[test]
    fn test_notification_id_matches_rust() {
        let conn = conn();
        let id: i64 = conn
            .query_row("SELECT notification_id(42, 15, 1234)", [], |row| row.get(0))
            .expect("query");
        assert_eq!(id, hive_types::notification_id(42, 15, 1234));
    }

    #[test]
    fn test_reputation_bucket() {
        let conn = conn();
        let score: i32 = conn
            .query_row("SELECT reputation_bucket(1)", [], |row| row.get(0))
            .expect("query");
        assert_eq!(score, 70);
    }

    #[test]
    fn test_notify_vote_score_accepts_integer_payout() {
        let conn = conn();
        let score: i32 = conn
            .query_row("SELECT notify_vote_score(1, 1000, 100)", [], |row| row.get(0))
            .expect("query");
        assert_eq!(score, 50);
        let suppressed: i32 = conn
            .query_row("SELECT notify_vote_score(1.0, 0, 100)", [], |row| row.get(0))
            .expect("query");
        assert_eq!(suppressed, hive_scoring::SUPPRESSED);
    }
}
