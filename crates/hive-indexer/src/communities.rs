//! Communities and subscriptions.
//!
//! A community is an account whose name has the form `hive-NNNNN`; it is
//! registered together with the account and shares its id.

use hive_db::queries::{accounts, communities};
use rusqlite::Connection;
use serde::Deserialize;

use crate::Result;

/// Whether `name` is a community account name: `hive-` followed by a
/// digit 1-3 and four to six more digits.
pub fn is_community_name(name: &str) -> bool {
    let Some(digits) = name.strip_prefix("hive-") else {
        return false;
    };
    let bytes = digits.as_bytes();
    (5..=7).contains(&bytes.len())
        && matches!(bytes[0], b'1'..=b'3')
        && bytes.iter().all(u8::is_ascii_digit)
}

/// Register the community of a freshly created account.
pub fn register(
    conn: &Connection,
    account_id: i64,
    name: &str,
    created_at: u64,
    block_num: u32,
) -> Result<bool> {
    let created = communities::insert(conn, account_id, name, created_at, block_num)?;
    if created {
        tracing::debug!(name, "community registered");
    }
    Ok(created)
}

#[derive(Debug, Deserialize)]
struct CommunityPayload {
    community: String,
}

/// Result of a community operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityOutcome {
    Subscribed,
    Unsubscribed,
    /// Valid, but nothing changed (already subscribed, not subscribed).
    Unchanged,
    Rejected(&'static str),
}

/// Apply a `community` custom_json action on behalf of `actor`.
pub fn process_community_op(
    conn: &Connection,
    actor: &str,
    action: &str,
    payload: &serde_json::Value,
    created_at: u64,
    block_num: u32,
) -> Result<CommunityOutcome> {
    let Ok(payload) = CommunityPayload::deserialize(payload) else {
        return Ok(reject("missing community"));
    };
    let Some(account_id) = accounts::find_id(conn, actor)? else {
        return Ok(reject("unknown account"));
    };
    let Some(community_id) = communities::find_id(conn, &payload.community)? else {
        return Ok(reject("unknown community"));
    };

    let changed = match action {
        "subscribe" => {
            communities::subscribe(conn, account_id, community_id, created_at, block_num)?
        }
        "unsubscribe" => communities::unsubscribe(conn, account_id, community_id)?,
        _ => return Ok(reject("unsupported community action")),
    };

    Ok(match (action, changed) {
        (_, false) => CommunityOutcome::Unchanged,
        ("subscribe", true) => CommunityOutcome::Subscribed,
        _ => CommunityOutcome::Unsubscribed,
    })
}

fn reject(reason: &'static str) -> CommunityOutcome {
    tracing::debug!(reason, "community op rejected");
    CommunityOutcome::Rejected(reason)
}
