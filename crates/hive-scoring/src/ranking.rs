//! Hot and trending ranking.
//!
//! ```text
//! rshares_term(r) = sign(r) * log10(max(1, |r| / 10_000_000))
//! hot(r, t)       = rshares_term(r) + t / 10_000
//! trending(r, t)  = rshares_term(r) + t / 240_000
//! ```
//!
//! `t` is the post creation time in Unix seconds. A newer post starts with a
//! higher time term, so at equal vote weight older posts rank lower; the
//! trending divisor makes age matter 24x less than for hot.

use serde::{Deserialize, Serialize};

/// Seconds per unit of the hot time term.
pub const HOT_TIME_DIVISOR: f64 = 10_000.0;

/// Seconds per unit of the trending time term.
pub const TREND_TIME_DIVISOR: f64 = 240_000.0;

/// Rshares below this magnitude contribute nothing.
pub const RSHARES_DIVISOR: f64 = 10_000_000.0;

/// Stored ranking scores of a post.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostScores {
    pub hot: f64,
    pub trend: f64,
}

impl PostScores {
    /// Scores for a post created at `created_at` carrying net `rshares`.
    pub fn compute(rshares: i64, created_at: u64) -> Self {
        Self {
            hot: hot(rshares, created_at),
            trend: trending(rshares, created_at),
        }
    }
}

/// Recency term of the hot score.
pub fn time_hot(created_at: u64) -> f64 {
    created_at as f64 / HOT_TIME_DIVISOR
}

/// Recency term of the trending score.
pub fn time_trend(created_at: u64) -> f64 {
    created_at as f64 / TREND_TIME_DIVISOR
}

/// Vote-weight term shared by hot and trending.
pub fn rshares_term(rshares: i64) -> f64 {
    let scaled = rshares as f64 / RSHARES_DIVISOR;
    let magnitude = scaled.abs().max(1.0).log10();
    if scaled > 0.0 {
        magnitude
    } else {
        -magnitude
    }
}

pub fn hot(rshares: i64, created_at: u64) -> f64 {
    rshares_term(rshares) + time_hot(created_at)
}

pub fn trending(rshares: i64, created_at: u64) -> f64 {
    rshares_term(rshares) + time_trend(created_at)
}
