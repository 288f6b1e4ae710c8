//! Post lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of one post row.
///
/// Stored as the `counter_deleted` column: 0 is live, `n > 0` is the n-th
/// deleted incarnation of the same (author, permlink).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostState {
    Live,
    Deleted(u32),
}

impl PostState {
    pub fn from_counter(counter_deleted: i64) -> Self {
        if counter_deleted <= 0 {
            PostState::Live
        } else {
            PostState::Deleted(counter_deleted as u32)
        }
    }

    pub fn counter(self) -> i64 {
        match self {
            PostState::Live => 0,
            PostState::Deleted(version) => i64::from(version),
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, PostState::Live)
    }
}
