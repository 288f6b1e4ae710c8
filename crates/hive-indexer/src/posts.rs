//! Post lifecycle: create, edit, soft delete.
//!
//! A comment operation for an (author, permlink) with no live row creates a
//! post; with a live row it is an edit. Tree position, category and
//! community are fixed when the row is created. Deleting bumps
//! `counter_deleted` past every earlier incarnation, which frees the
//! permlink for a new live row while the old rows stay for audit.

use hive_db::queries::{communities, interned, posts, reblogs};
use hive_scoring::PostScores;
use hive_types::{PostId, PostState};
use rusqlite::Connection;

use crate::{accounts, feed_cache, IndexerError, Result};

/// A comment operation as seen by [`upsert_post`].
#[derive(Debug, Clone, Copy)]
pub struct CommentOp<'a> {
    pub author: &'a str,
    pub permlink: &'a str,
    /// Empty for a root post.
    pub parent_author: &'a str,
    /// Parent permlink of a reply; the category of a root post.
    pub parent_permlink: &'a str,
}

/// Result of [`upsert_post`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertedPost {
    pub is_new: bool,
    pub post_id: PostId,
    pub author_id: i64,
    pub permlink_id: i64,
    pub category: String,
    pub parent_id: PostId,
    pub community_id: Option<i64>,
    pub is_valid: bool,
    pub is_muted: bool,
    pub depth: i64,
}

/// Create or edit a post.
///
/// Fails with [`IndexerError::Inconsistency`] when the author or the parent
/// post does not exist.
pub fn upsert_post(
    conn: &Connection,
    op: &CommentOp<'_>,
    timestamp: u64,
    block_num: u32,
    community_cutoff: u64,
) -> Result<UpsertedPost> {
    let author_id = accounts::require_id(conn, op.author)?;
    let permlink_id = interned::intern_permlink(conn, op.permlink)?;

    if let Some(existing) = posts::find_live(conn, author_id, permlink_id)? {
        posts::touch(conn, existing.id, timestamp, block_num)?;
        tracing::trace!(post_id = existing.id, "post edited");
        return Ok(UpsertedPost {
            is_new: false,
            post_id: existing.id,
            author_id,
            permlink_id,
            category: interned::category_name(conn, existing.category_id)?,
            parent_id: existing.parent_id,
            community_id: existing.community_id,
            is_valid: existing.is_valid,
            is_muted: existing.is_muted,
            depth: existing.depth,
        });
    }

    let scores = PostScores::compute(0, timestamp);
    let new_post = if op.parent_author.is_empty() {
        let category_id = interned::intern_category(conn, op.parent_permlink)?;
        let community_id = if timestamp > community_cutoff {
            communities::find_id(conn, op.parent_permlink)?
        } else {
            None
        };
        posts::NewPost {
            parent_id: 0,
            root_id: 0,
            author_id,
            permlink_id,
            category_id,
            community_id,
            depth: 0,
            is_muted: false,
            is_valid: true,
            created_at: timestamp,
            sc_hot: scores.hot,
            sc_trend: scores.trend,
            block_num,
        }
    } else {
        let parent = posts::find_live_by_name(conn, op.parent_author, op.parent_permlink)?
            .ok_or_else(|| {
                IndexerError::Inconsistency(format!(
                    "parent {}/{} of {}/{} not found",
                    op.parent_author, op.parent_permlink, op.author, op.permlink
                ))
            })?;
        let community_id = match parent.community_id {
            Some(id) => Some(id),
            None if timestamp > community_cutoff => {
                communities::find_id(conn, op.parent_permlink)?
            }
            None => None,
        };
        posts::NewPost {
            parent_id: parent.id,
            root_id: if parent.root_id == 0 {
                parent.id
            } else {
                parent.root_id
            },
            author_id,
            permlink_id,
            category_id: parent.category_id,
            community_id,
            depth: parent.depth + 1,
            is_muted: parent.is_muted,
            is_valid: parent.is_valid,
            created_at: timestamp,
            sc_hot: scores.hot,
            sc_trend: scores.trend,
            block_num,
        }
    };

    let post_id = posts::insert(conn, &new_post)?;
    if new_post.depth == 0 {
        feed_cache::insert(conn, post_id, author_id, timestamp, block_num)?;
    }
    tracing::trace!(post_id, depth = new_post.depth, "post created");

    Ok(UpsertedPost {
        is_new: true,
        post_id,
        author_id,
        permlink_id,
        category: interned::category_name(conn, new_post.category_id)?,
        parent_id: new_post.parent_id,
        community_id: new_post.community_id,
        is_valid: new_post.is_valid,
        is_muted: new_post.is_muted,
        depth: new_post.depth,
    })
}

/// Soft-delete the live post for (author, permlink).
///
/// Deleting a root post also drops every feed entry and stored reblog of
/// it; reblogs still queued are dropped by the caller.
///
/// Returns the deleted post's id and depth, or `None` when there is no live
/// post (not an error: deletes of unknown posts are tolerated).
pub fn delete_post(
    conn: &Connection,
    author: &str,
    permlink: &str,
    block_num: u32,
) -> Result<Option<(PostId, i64)>> {
    let Some(post) = posts::find_live_by_name(conn, author, permlink)? else {
        tracing::debug!(author, permlink, "delete of unknown post ignored");
        return Ok(None);
    };

    let counter = posts::max_counter_deleted(conn, post.author_id, post.permlink_id)? + 1;
    posts::mark_deleted(
        conn,
        post.id,
        PostState::from_counter(counter),
        block_num,
    )?;
    if post.depth == 0 {
        feed_cache::delete_for_post(conn, post.id)?;
        let reblogs = reblogs::delete_for_post(conn, post.id)?;
        tracing::trace!(post_id = post.id, reblogs, "reblogs of deleted post removed");
    }
    tracing::trace!(post_id = post.id, counter, "post deleted");
    Ok(Some((post.id, post.depth)))
}

/// Id of the live post for (author, permlink).
///
/// Returns 0 when there is none, unless `must_exist` is set, in which case
/// the missing post is an [`IndexerError::Inconsistency`]. An empty author
/// and permlink name no post and always yield 0.
pub fn find_post(
    conn: &Connection,
    author: &str,
    permlink: &str,
    must_exist: bool,
) -> Result<PostId> {
    if author.is_empty() && permlink.is_empty() {
        return Ok(0);
    }
    match posts::find_live_by_name(conn, author, permlink)? {
        Some(post) => Ok(post.id),
        None if must_exist => Err(IndexerError::Inconsistency(format!(
            "post {author}/{permlink} not found"
        ))),
        None => Ok(0),
    }
}

/// Store payout figures for the live post (author, permlink).
pub fn update_payout(
    conn: &Connection,
    author: &str,
    permlink: &str,
    payout: f64,
    pending_payout: f64,
    is_paidout: bool,
) -> Result<()> {
    match posts::find_live_by_name(conn, author, permlink)? {
        Some(post) => {
            posts::update_payout(conn, post.id, payout, pending_payout, is_paidout)?;
        }
        None => tracing::debug!(author, permlink, "payout for unknown post ignored"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = hive_db::open_memory().expect("open");
        for name in ["alice", "bob", "carol", "hive-123456"] {
            accounts::register(&conn, name, 1, 1).expect("account");
        }
        conn
    }

    fn root<'a>(author: &'a str, permlink: &'a str, category: &'a str) -> CommentOp<'a> {
        CommentOp {
            author,
            permlink,
            parent_author: "",
            parent_permlink: category,
        }
    }

    fn reply<'a>(author: &'a str, permlink: &'a str, parent: (&'a str, &'a str)) -> CommentOp<'a> {
        CommentOp {
            author,
            permlink,
            parent_author: parent.0,
            parent_permlink: parent.1,
        }
    }

    #[test]
    fn test_create_root() {
        let conn = setup();
        let post = upsert_post(&conn, &root("alice", "foo", "photo"), 1000, 2, 0).expect("create");
        assert!(post.is_new);
        assert_eq!(post.depth, 0);
        assert_eq!(post.parent_id, 0);
        assert_eq!(post.category, "photo");
        assert_eq!(post.community_id, None);

        let row = posts::get(&conn, post.post_id).expect("get");
        assert_eq!(row.root_id, 0);
        let feed = feed_cache::list_by_account(&conn, post.author_id, None, 10).expect("feed");
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_reply_inherits_from_parent() {
        let conn = setup();
        let parent =
            upsert_post(&conn, &root("alice", "foo", "hive-123456"), 1000, 2, 0).expect("root");
        assert!(parent.community_id.is_some());

        let child =
            upsert_post(&conn, &reply("bob", "bar", ("alice", "foo")), 1010, 3, 0).expect("reply");
        assert_eq!(child.depth, 1);
        assert_eq!(child.parent_id, parent.post_id);
        assert_eq!(child.category, "hive-123456");
        assert_eq!(child.community_id, parent.community_id);
        assert_eq!(posts::get(&conn, child.post_id).expect("get").root_id, parent.post_id);

        let grandchild = upsert_post(&conn, &reply("carol", "baz", ("bob", "bar")), 1020, 4, 0)
            .expect("reply to reply");
        assert_eq!(grandchild.depth, 2);
        assert_eq!(
            posts::get(&conn, grandchild.post_id).expect("get").root_id,
            parent.post_id
        );
        // Replies never enter the feed cache.
        assert!(feed_cache::list_by_account(&conn, child.author_id, None, 10)
            .expect("feed")
            .is_empty());
    }

    #[test]
    fn test_community_cutoff() {
        let conn = setup();
        let post =
            upsert_post(&conn, &root("alice", "old", "hive-123456"), 1000, 2, 1000).expect("root");
        assert_eq!(post.community_id, None);
        let post =
            upsert_post(&conn, &root("alice", "new", "hive-123456"), 1001, 3, 1000).expect("root");
        assert!(post.community_id.is_some());
    }

    #[test]
    fn test_edit_keeps_structure() {
        let conn = setup();
        let created = upsert_post(&conn, &root("alice", "foo", "photo"), 1000, 2, 0).expect("create");
        let edited =
            upsert_post(&conn, &root("alice", "foo", "music"), 2000, 3, 0).expect("edit");
        assert!(!edited.is_new);
        assert_eq!(edited.post_id, created.post_id);
        assert_eq!(edited.category, "photo");

        let row = posts::get(&conn, created.post_id).expect("get");
        assert_eq!(row.created_at, 1000);
        assert_eq!(row.updated_at, 2000);
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let conn = setup();
        let result = upsert_post(&conn, &reply("bob", "bar", ("alice", "nope")), 1000, 2, 0);
        assert!(matches!(result, Err(IndexerError::Inconsistency(_))));
    }

    #[test]
    fn test_unknown_author_is_fatal() {
        let conn = setup();
        let result = upsert_post(&conn, &root("ghost", "foo", "photo"), 1000, 2, 0);
        assert!(matches!(result, Err(IndexerError::Inconsistency(_))));
    }

    #[test]
    fn test_delete_and_recreate() {
        let conn = setup();
        let first = upsert_post(&conn, &root("alice", "foo", "photo"), 1000, 2, 0).expect("create");
        let deleted = delete_post(&conn, "alice", "foo", 3).expect("delete");
        assert_eq!(deleted, Some((first.post_id, 0)));
        assert_eq!(
            posts::get(&conn, first.post_id).expect("get").state,
            PostState::Deleted(1)
        );
        assert!(feed_cache::list_by_account(&conn, first.author_id, None, 10)
            .expect("feed")
            .is_empty());
        assert_eq!(find_post(&conn, "alice", "foo", false).expect("find"), 0);

        let second = upsert_post(&conn, &root("alice", "foo", "photo"), 1100, 4, 0).expect("again");
        assert!(second.is_new);
        assert_ne!(second.post_id, first.post_id);
        delete_post(&conn, "alice", "foo", 5).expect("delete again");
        assert_eq!(
            posts::get(&conn, second.post_id).expect("get").state,
            PostState::Deleted(2)
        );
    }

    #[test]
    fn test_delete_root_drops_stored_reblogs() {
        let conn = setup();
        let post = upsert_post(&conn, &root("alice", "foo", "photo"), 1000, 2, 0).expect("create");
        let comment = upsert_post(&conn, &reply("bob", "re", ("alice", "foo")), 1010, 3, 0)
            .expect("reply");
        let bob = accounts::require_id(&conn, "bob").expect("bob");
        reblogs::insert_chunk(
            &conn,
            &[reblogs::NewReblog {
                blogger_id: bob,
                post_id: post.post_id,
                created_at: 1020,
                block_num: 4,
            }],
        )
        .expect("reblog");

        delete_post(&conn, "bob", "re", 5).expect("delete reply");
        assert_eq!(reblogs::count_for_post(&conn, post.post_id).expect("count"), 1);
        assert_eq!(comment.depth, 1);

        delete_post(&conn, "alice", "foo", 6).expect("delete root");
        assert_eq!(reblogs::count_for_post(&conn, post.post_id).expect("count"), 0);
    }

    #[test]
    fn test_delete_unknown_is_not_fatal() {
        let conn = setup();
        assert_eq!(delete_post(&conn, "alice", "nope", 2).expect("delete"), None);
    }

    #[test]
    fn test_find_post_must_exist() {
        let conn = setup();
        assert_eq!(find_post(&conn, "alice", "foo", false).expect("find"), 0);
        assert!(matches!(
            find_post(&conn, "alice", "foo", true),
            Err(IndexerError::Inconsistency(_))
        ));
        assert_eq!(find_post(&conn, "", "", true).expect("no parent"), 0);
    }

    #[test]
    fn test_reply_falls_back_to_parent_permlink_community() {
        let conn = setup();
        let parent =
            upsert_post(&conn, &root("alice", "hive-123456", "photo"), 1000, 2, 0).expect("root");
        assert_eq!(parent.community_id, None);

        let early = reply("bob", "early", ("alice", "hive-123456"));
        let before_cutoff = upsert_post(&conn, &early, 1000, 3, 1000).expect("reply");
        assert_eq!(before_cutoff.community_id, None);
        let late = reply("bob", "late", ("alice", "hive-123456"));
        let child = upsert_post(&conn, &late, 1010, 4, 1000).expect("reply");
        assert!(child.community_id.is_some());
        assert_eq!(child.category, "photo");
    }

    #[test]
    fn test_payout_update() {
        let conn = setup();
        let post = upsert_post(&conn, &root("alice", "foo", "photo"), 1000, 2, 0).expect("create");
        update_payout(&conn, "alice", "foo", 3.5, 1.0, false).expect("payout");
        update_payout(&conn, "alice", "nope", 3.5, 1.0, false).expect("unknown is fine");
        let row = posts::get(&conn, post.post_id).expect("get");
        assert_eq!(row.payout, 3.5);
        assert_eq!(row.pending_payout, 1.0);
    }
}
