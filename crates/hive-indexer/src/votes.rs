//! Vote handling.

use hive_db::queries::{posts, votes};
use hive_scoring::PostScores;
use hive_types::PostId;
use rusqlite::Connection;

use crate::{accounts, IndexerError, Result};

/// A vote operation.
#[derive(Debug, Clone, Copy)]
pub struct VoteOp<'a> {
    pub voter: &'a str,
    pub author: &'a str,
    pub permlink: &'a str,
    pub weight: i32,
    /// Present on effective votes.
    pub rshares: Option<i64>,
}

/// Apply a vote to the live post (author, permlink).
///
/// The post must exist. An effective vote moves the post's net and absolute
/// rshares by the difference to the voter's previous effective vote and
/// refreshes the post's ranking scores. Returns the post id.
pub fn process_vote(
    conn: &Connection,
    op: &VoteOp<'_>,
    timestamp: u64,
    block_num: u32,
) -> Result<PostId> {
    let voter_id = accounts::require_id(conn, op.voter)?;
    let post = posts::find_live_by_name(conn, op.author, op.permlink)?.ok_or_else(|| {
        IndexerError::Inconsistency(format!(
            "vote by {} on missing post {}/{}",
            op.voter, op.author, op.permlink
        ))
    })?;

    let previous = votes::upsert(
        conn,
        &votes::VoteUpsert {
            post_id: post.id,
            voter_id,
            author_id: post.author_id,
            permlink_id: post.permlink_id,
            vote_percent: op.weight,
            rshares: op.rshares,
            last_update: timestamp,
            block_num,
        },
    )?;

    if let Some(rshares) = op.rshares {
        // A vote left on a deleted incarnation does not count against this post.
        let old = previous
            .filter(|prev| prev.post_id == post.id && prev.is_effective)
            .map_or(0, |prev| prev.rshares);
        let net_delta = rshares - old;
        let abs_delta = rshares.abs() - old.abs();
        if net_delta != 0 || abs_delta != 0 {
            let net = posts::apply_vote_delta(conn, post.id, net_delta, abs_delta)?;
            let scores = PostScores::compute(net, post.created_at);
            posts::set_scores(conn, post.id, scores.hot, scores.trend)?;
        }
    }

    tracing::trace!(post_id = post.id, voter = op.voter, "vote applied");
    Ok(post.id)
}

/// Votes on a post ordered by voter id, continuing after `start_voter`.
pub fn list_votes_by_post(
    conn: &Connection,
    post_id: PostId,
    start_voter: Option<&str>,
    limit: u32,
) -> Result<Vec<votes::VoteRow>> {
    let start = match start_voter {
        Some(name) => Some(accounts::require_id(conn, name)?),
        None => None,
    };
    Ok(votes::list_by_post(conn, post_id, start, limit)?)
}

/// Votes cast by `voter` ordered by post id, continuing after `start_post`.
pub fn list_votes_by_voter(
    conn: &Connection,
    voter: &str,
    start_post: Option<PostId>,
    limit: u32,
) -> Result<Vec<votes::VoteRow>> {
    let voter_id = accounts::require_id(conn, voter)?;
    Ok(votes::list_by_voter(conn, voter_id, start_post, limit)?)
}
