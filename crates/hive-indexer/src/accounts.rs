//! Account registration and reputation.

use hive_db::queries::accounts;
use rusqlite::Connection;

use crate::{communities, IndexerError, Result};

/// Register an account. Names of the community form also register the
/// community. Returns the account id.
pub fn register(conn: &Connection, name: &str, created_at: u64, block_num: u32) -> Result<i64> {
    if !accounts::insert(conn, name, created_at, block_num)? {
        tracing::trace!(name, "account already registered");
    }
    let id = require_id(conn, name)?;
    if communities::is_community_name(name) {
        communities::register(conn, id, name, created_at, block_num)?;
    }
    Ok(id)
}

/// Id of an account the feed guarantees to exist.
pub fn require_id(conn: &Connection, name: &str) -> Result<i64> {
    accounts::find_id(conn, name)?
        .ok_or_else(|| IndexerError::Inconsistency(format!("unknown account {name}")))
}

/// Store a reputation update. Unknown accounts are skipped.
pub fn update_reputation(conn: &Connection, name: &str, reputation: f64) -> Result<()> {
    if !accounts::set_reputation(conn, name, reputation)? {
        tracing::debug!(name, "reputation for unknown account ignored");
    }
    Ok(())
}

/// Recompute stored reputation ranks of all accounts.
pub fn refresh_ranks(conn: &Connection) -> Result<usize> {
    let changed = accounts::update_ranks(conn)?;
    tracing::debug!(changed, "account ranks refreshed");
    Ok(changed)
}

/// Notification score of an event caused by `account_id`.
pub fn default_score(conn: &Connection, account_id: i64) -> Result<i32> {
    let rank = accounts::rank_position(conn, account_id)?;
    Ok(hive_scoring::reputation_bucket(rank))
}
