//! # hive-scoring
//!
//! Pure scoring functions used by the indexer.
//!
//! ## Modules
//!
//! - [`ranking`] — hot/trending scores: a vote-weight term plus a recency term.
//! - [`relevance`] — reputation bucketing and vote-notification relevance.
//!
//! Scores are computed once, at the mutation that changes their inputs
//! (post creation, effective vote), and stored with the post.

pub mod ranking;
pub mod relevance;

pub use ranking::{hot, rshares_term, time_hot, time_trend, trending, PostScores};
pub use relevance::{notify_vote_score, reputation_bucket, SUPPRESSED};
