//! Notification relevance scores.
//!
//! Relevance is a small integer in `[0, 100]` used by readers as a
//! `min_score` filter. Source accounts are weighted by their reputation
//! rank; votes by their share of the post payout.

/// Returned by [`notify_vote_score`] when the vote must not notify.
pub const SUPPRESSED: i32 = -1;

/// Contribution below which a vote never notifies.
pub const MIN_VOTE_CONTRIBUTION: f64 = 20.0;

/// Score of a new-community notification.
pub const NEW_COMMUNITY_SCORE: i32 = 35;

/// Map an account's reputation rank (1 = highest reputation) to a score.
pub fn reputation_bucket(rank: i64) -> i32 {
    match rank {
        r if r < 200 => 70,
        r if r < 1_000 => 60,
        r if r < 6_500 => 50,
        r if r < 25_000 => 40,
        r if r < 100_000 => 30,
        _ => 20,
    }
}

/// Relevance of a vote notification.
///
/// The vote's contribution is `payout / abs_rshares * 1000 * vote_rshares`,
/// rounded to an integer. Below [`MIN_VOTE_CONTRIBUTION`] (or when the post
/// has no absolute vote weight yet) the vote is [`SUPPRESSED`]. Otherwise
/// every decimal digit past the first is worth 25 points, capped at 100.
pub fn notify_vote_score(payout: f64, abs_rshares: i64, vote_rshares: i64) -> i32 {
    if abs_rshares == 0 {
        return SUPPRESSED;
    }
    let contribution = payout / abs_rshares as f64 * 1000.0 * vote_rshares as f64;
    // NaN fails this comparison too.
    if !(contribution >= MIN_VOTE_CONTRIBUTION) {
        return SUPPRESSED;
    }
    let digits = decimal_digits(contribution.round() as u64);
    ((digits - 1) * 25).min(100)
}

fn decimal_digits(mut value: u64) -> i32 {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}
