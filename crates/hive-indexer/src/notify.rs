//! Notifications.
//!
//! Most notifications are derived on read from the rows that caused them
//! (replies, follows, reblogs, subscriptions, new communities, votes); see
//! the `hive_notifications_view` in the schema. The indexer only persists
//! events that have no row of their own to derive from, and reblogs seen
//! during live sync.

use hive_db::queries::notifs::{self, NewNotif, NotifTarget};
use hive_db::queries::{accounts, blocks, posts};
use hive_types::{NotifyType, SyncMode, NOTIFICATION_WINDOW_BLOCKS};
use rusqlite::Connection;
use serde::Serialize;

use crate::{IndexerError, Result};

/// A notification to persist.
#[derive(Debug, Clone)]
pub struct Notify {
    pub kind: NotifyType,
    pub src_id: Option<i64>,
    pub dst_id: Option<i64>,
    pub post_id: Option<i64>,
    pub community_id: Option<i64>,
    pub score: i32,
    pub created_at: u64,
    pub payload: Option<String>,
}

impl Notify {
    /// Persist the notification unless `mode` is initial sync.
    ///
    /// Returns `true` when a row was written; a notification about a post
    /// already stored for the same (type, src, dst) is not written again.
    pub fn write(&self, conn: &Connection, mode: SyncMode, block_num: u32) -> Result<bool> {
        if mode.is_initial() {
            return Ok(false);
        }
        let written = notifs::insert(
            conn,
            &NewNotif {
                block_num,
                type_id: self.kind.id(),
                score: self.score,
                created_at: self.created_at,
                src_id: self.src_id,
                dst_id: self.dst_id,
                post_id: self.post_id,
                community_id: self.community_id,
                payload: self.payload.clone(),
            },
        )?;
        tracing::trace!(kind = ?self.kind, written, "notification");
        Ok(written)
    }
}

/// A notification as served to readers.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub kind: NotifyType,
    pub block_num: u32,
    pub created_at: u64,
    pub score: i32,
    pub src: Option<String>,
    pub dst: Option<String>,
    pub author: Option<String>,
    pub permlink: Option<String>,
    pub community: Option<String>,
    pub payload: Option<String>,
}

impl TryFrom<notifs::NotifRow> for Notification {
    type Error = IndexerError;

    fn try_from(row: notifs::NotifRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            kind: NotifyType::try_from(row.type_id)?,
            block_num: row.block_num,
            created_at: row.created_at,
            score: row.score,
            src: row.src,
            dst: row.dst,
            author: row.author,
            permlink: row.permlink,
            community: row.community,
            payload: row.payload,
        })
    }
}

/// Notifications addressed to `account`, newest first.
///
/// Only rows within the look-back window behind the head block and with
/// `score >= min_score` are returned; `last_id` continues after a
/// previously returned id.
pub fn fetch_by_account(
    conn: &Connection,
    account: &str,
    min_score: i32,
    last_id: Option<i64>,
    limit: u32,
) -> Result<Vec<Notification>> {
    let account_id = accounts::find_id(conn, account)?
        .ok_or_else(|| hive_db::DbError::NotFound(format!("account {account}")))?;
    fetch(conn, NotifTarget::Account(account_id), min_score, last_id, limit)
}

/// Notifications about the live post (author, permlink), newest first.
pub fn fetch_by_post(
    conn: &Connection,
    author: &str,
    permlink: &str,
    min_score: i32,
    last_id: Option<i64>,
    limit: u32,
) -> Result<Vec<Notification>> {
    let post = posts::find_live_by_name(conn, author, permlink)?
        .ok_or_else(|| hive_db::DbError::NotFound(format!("post {author}/{permlink}")))?;
    fetch(conn, NotifTarget::Post(post.id), min_score, last_id, limit)
}

fn fetch(
    conn: &Connection,
    target: NotifTarget,
    min_score: i32,
    last_id: Option<i64>,
    limit: u32,
) -> Result<Vec<Notification>> {
    let head = blocks::head_num(conn)?;
    let min_block = head.saturating_sub(NOTIFICATION_WINDOW_BLOCKS);
    notifs::fetch(conn, target, min_block, min_score, last_id, limit)?
        .into_iter()
        .map(Notification::try_from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts as account_ops;

    fn setup() -> (Connection, i64, i64) {
        let conn = hive_db::open_memory().expect("open");
        let alice = account_ops::register(&conn, "alice", 1, 1).expect("alice");
        let bob = account_ops::register(&conn, "bob", 1, 1).expect("bob");
        (conn, alice, bob)
    }

    fn mention(src: i64, dst: i64, created_at: u64) -> Notify {
        Notify {
            kind: NotifyType::Mention,
            src_id: Some(src),
            dst_id: Some(dst),
            post_id: None,
            community_id: None,
            score: 40,
            created_at,
            payload: None,
        }
    }

    #[test]
    fn test_initial_sync_suppresses_writes() {
        let (conn, alice, bob) = setup();
        assert!(!mention(bob, alice, 10).write(&conn, SyncMode::Initial, 3).expect("write"));
        assert!(fetch_by_account(&conn, "alice", 0, None, 10).expect("fetch").is_empty());
        assert!(mention(bob, alice, 10).write(&conn, SyncMode::Live, 3).expect("write"));
        assert_eq!(fetch_by_account(&conn, "alice", 0, None, 10).expect("fetch").len(), 1);
    }

    #[test]
    fn test_fetch_pages_by_id() {
        let (conn, alice, bob) = setup();
        for block in 2..=4 {
            mention(bob, alice, u64::from(block) * 3)
                .write(&conn, SyncMode::Live, block)
                .expect("write");
        }

        let first = fetch_by_account(&conn, "alice", 0, None, 2).expect("page 1");
        assert_eq!(first.len(), 2);
        assert!(first[0].id > first[1].id);
        assert_eq!(first[0].block_num, 4);
        assert_eq!(first[0].kind, NotifyType::Mention);

        let rest = fetch_by_account(&conn, "alice", 0, Some(first[1].id), 2).expect("page 2");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].block_num, 2);
    }

    #[test]
    fn test_fetch_unknown_account() {
        let (conn, _, _) = setup();
        assert!(matches!(
            fetch_by_account(&conn, "ghost", 0, None, 10),
            Err(IndexerError::Db(hive_db::DbError::NotFound(_)))
        ));
    }
}
