//! Follow operations.
//!
//! Payload: `{"follower": .., "following": .. | [..], "what": [..]}` where
//! `what` selects the new state of each edge.

use hive_db::queries::{accounts, follows};
use hive_types::FollowState;
use rusqlite::Connection;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize)]
struct FollowPayload {
    follower: String,
    following: Following,
    #[serde(default)]
    what: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Following {
    One(String),
    Many(Vec<String>),
}

impl Following {
    fn into_vec(self) -> Vec<String> {
        match self {
            Following::One(name) => vec![name],
            Following::Many(names) => names,
        }
    }
}

/// Change requested by `what`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    State(FollowState),
    Blacklist(bool),
    FollowBlacklist(bool),
}

impl Action {
    fn parse(what: &[String]) -> Option<Self> {
        let action = match what.first().map(String::as_str).unwrap_or("") {
            "" => Action::State(FollowState::None),
            "blog" => Action::State(FollowState::Follow),
            "ignore" => Action::State(FollowState::Mute),
            "blacklist" => Action::Blacklist(true),
            "unblacklist" => Action::Blacklist(false),
            "follow_blacklist" => Action::FollowBlacklist(true),
            "unfollow_blacklist" => Action::FollowBlacklist(false),
            _ => return None,
        };
        Some(action)
    }

    fn apply(self, edge: &mut follows::FollowRow) {
        match self {
            Action::State(state) => edge.state = state,
            Action::Blacklist(on) => edge.blacklisted = on,
            Action::FollowBlacklist(on) => edge.follow_blacklists = on,
        }
    }
}

/// Result of a follow operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    /// Number of edges written.
    Applied(usize),
    Rejected(&'static str),
}

/// Apply a follow operation on behalf of `actor`.
///
/// Malformed or impersonating operations are rejected without error. Edges
/// to unknown accounts or to the follower itself are skipped. Follower
/// counts move only when an edge enters or leaves the follow state, so
/// applying the same operation twice changes nothing.
pub fn process_follow_op(
    conn: &Connection,
    actor: &str,
    payload: &serde_json::Value,
    created_at: u64,
    block_num: u32,
) -> Result<FollowOutcome> {
    let Ok(payload) = FollowPayload::deserialize(payload) else {
        return Ok(reject("malformed follow payload"));
    };
    if payload.follower != actor {
        return Ok(reject("follower is not the signer"));
    }
    let Some(action) = Action::parse(&payload.what) else {
        return Ok(reject("unknown follow action"));
    };
    let Some(follower_id) = accounts::find_id(conn, &payload.follower)? else {
        return Ok(reject("unknown follower"));
    };

    let mut applied = 0;
    for following in payload.following.into_vec() {
        if following == payload.follower {
            continue;
        }
        let Some(following_id) = accounts::find_id(conn, &following)? else {
            tracing::debug!(following, "follow of unknown account skipped");
            continue;
        };

        let mut edge = follows::get(conn, follower_id, following_id)?
            .unwrap_or_else(|| follows::FollowRow::new(follower_id, following_id, created_at, block_num));
        let was_following = edge.state == FollowState::Follow;
        action.apply(&mut edge);
        edge.created_at = created_at;
        edge.block_num = block_num;
        follows::upsert(conn, &edge)?;

        match (was_following, edge.state == FollowState::Follow) {
            (false, true) => accounts::adjust_follow_counts(conn, follower_id, following_id, 1)?,
            (true, false) => accounts::adjust_follow_counts(conn, follower_id, following_id, -1)?,
            _ => {}
        }
        applied += 1;
    }

    Ok(FollowOutcome::Applied(applied))
}

fn reject(reason: &'static str) -> FollowOutcome {
    tracing::debug!(reason, "follow op rejected");
    FollowOutcome::Rejected(reason)
}
