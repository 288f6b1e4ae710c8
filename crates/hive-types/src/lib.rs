//! # hive-types
//!
//! Shared domain types for the hive state mirror: the upstream block feed,
//! the operations it carries, and the small enums persisted as integers in
//! the store (follow state, notification type, post lifecycle).

pub mod block;
pub mod follow;
pub mod notify;
pub mod operation;
pub mod post;

pub use block::{Block, SyncMode};
pub use follow::FollowState;
pub use notify::{notification_id, NotifyType};
pub use operation::Operation;
pub use post::PostState;

/// Common row id aliases. Zero is the "no row" sentinel for posts.
pub type AccountId = i64;
pub type PostId = i64;
pub type PermlinkId = i64;
pub type CategoryId = i64;
pub type CommunityId = i64;
pub type BlockNum = u32;

/// Nominal block interval of the chain, in seconds.
pub const BLOCK_INTERVAL_SECS: u64 = 3;

/// Notification look-back window (90 days) expressed in blocks.
pub const NOTIFICATION_WINDOW_BLOCKS: u32 = (90 * 24 * 3600 / BLOCK_INTERVAL_SECS) as u32;

/// Payout window of a post, in seconds (7 days).
pub const PAYOUT_WINDOW_SECS: u64 = 7 * 24 * 3600;

/// Errors raised while decoding feed payloads into domain types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: i64 },

    #[error("malformed payload: {0}")]
    Payload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_window() {
        assert_eq!(NOTIFICATION_WINDOW_BLOCKS, 2_592_000);
    }
}
