//! Reply-tree maintenance jobs.
//!
//! Both jobs run over a block range at range boundaries, or over the whole
//! table (`range = None`) when bootstrapping.

use std::ops::RangeInclusive;

use rusqlite::Connection;

use crate::Result;

fn bounds(range: Option<&RangeInclusive<u32>>) -> (u32, u32) {
    range.map_or((0, u32::MAX), |r| (*r.start(), *r.end()))
}

/// Point root posts created in `range` at themselves.
///
/// Root posts are inserted with `root_id = 0`; replies get their root at
/// insert time. Only rows still at 0 are touched, so repeated runs are
/// no-ops. Returns rows updated.
pub fn backfill_root_ids(conn: &Connection, range: Option<&RangeInclusive<u32>>) -> Result<usize> {
    let (first, last) = bounds(range);
    let updated = conn.execute(
        "UPDATE hive_posts SET root_id = id
         WHERE root_id = 0 AND block_num BETWEEN ?1 AND ?2",
        rusqlite::params![first, last],
    )?;
    tracing::trace!(updated, first, last, "root ids backfilled");
    Ok(updated)
}

/// Recount live direct replies of every post whose replies changed in
/// `range`.
///
/// A reply created, edited or deleted in the range moves its
/// `last_block_num` into the range, which marks its parent for a recount.
/// Returns rows updated.
pub fn recompute_children_counts(
    conn: &Connection,
    range: Option<&RangeInclusive<u32>>,
) -> Result<usize> {
    let updated = match range {
        Some(range) => conn.execute(
            "WITH affected AS (
                 SELECT DISTINCT parent_id AS id FROM hive_posts
                 WHERE depth > 0 AND last_block_num BETWEEN ?1 AND ?2
             )
             UPDATE hive_posts
             SET children = (
                 SELECT COUNT(*) FROM hive_posts c
                 WHERE c.parent_id = hive_posts.id AND c.counter_deleted = 0 AND c.depth > 0
             )
             WHERE id IN (SELECT id FROM affected)",
            rusqlite::params![range.start(), range.end()],
        )?,
        None => conn.execute(
            "UPDATE hive_posts
             SET children = (
                 SELECT COUNT(*) FROM hive_posts c
                 WHERE c.parent_id = hive_posts.id AND c.counter_deleted = 0 AND c.depth > 0
             )",
            [],
        )?,
    };
    tracing::trace!(updated, "children recounted");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::{delete_post, upsert_post, CommentOp};
    use hive_db::queries::posts;

    fn setup() -> Connection {
        let conn = hive_db::open_memory().expect("open");
        for name in ["alice", "bob", "carol"] {
            crate::accounts::register(&conn, name, 1, 1).expect("account");
        }
        conn
    }

    fn comment<'a>(author: &'a str, permlink: &'a str, parent: (&'a str, &'a str)) -> CommentOp<'a> {
        CommentOp {
            author,
            permlink,
            parent_author: parent.0,
            parent_permlink: parent.1,
        }
    }

    #[test]
    fn test_backfill_is_range_scoped_and_idempotent() {
        let conn = setup();
        let early = upsert_post(&conn, &comment("alice", "a", ("", "tag")), 10, 2, 0).expect("post");
        let late = upsert_post(&conn, &comment("alice", "b", ("", "tag")), 20, 9, 0).expect("post");

        assert_eq!(backfill_root_ids(&conn, Some(&(1..=5))).expect("backfill"), 1);
        assert_eq!(posts::get(&conn, early.post_id).expect("get").root_id, early.post_id);
        assert_eq!(posts::get(&conn, late.post_id).expect("get").root_id, 0);

        assert_eq!(backfill_root_ids(&conn, Some(&(1..=5))).expect("again"), 0);
        assert_eq!(backfill_root_ids(&conn, None).expect("all"), 1);
        assert_eq!(posts::get(&conn, late.post_id).expect("get").root_id, late.post_id);
    }

    #[test]
    fn test_children_counts_live_direct_replies() {
        let conn = setup();
        let root = upsert_post(&conn, &comment("alice", "r", ("", "tag")), 10, 2, 0).expect("root");
        upsert_post(&conn, &comment("bob", "c1", ("alice", "r")), 11, 3, 0).expect("reply");
        upsert_post(&conn, &comment("carol", "c2", ("alice", "r")), 12, 3, 0).expect("reply");
        let nested =
            upsert_post(&conn, &comment("alice", "c3", ("bob", "c1")), 13, 4, 0).expect("nested");

        recompute_children_counts(&conn, Some(&(2..=4))).expect("recount");
        assert_eq!(posts::get(&conn, root.post_id).expect("get").children, 2);

        delete_post(&conn, "carol", "c2", 5).expect("delete");
        recompute_children_counts(&conn, Some(&(5..=5))).expect("recount");
        assert_eq!(posts::get(&conn, root.post_id).expect("get").children, 1);
        assert_eq!(posts::get(&conn, nested.post_id).expect("get").children, 0);
    }

    #[test]
    fn test_full_recount_matches_range_recount() {
        let conn = setup();
        let root = upsert_post(&conn, &comment("alice", "r", ("", "tag")), 10, 2, 0).expect("root");
        let reply =
            upsert_post(&conn, &comment("bob", "c1", ("alice", "r")), 11, 3, 0).expect("reply");
        upsert_post(&conn, &comment("carol", "c2", ("bob", "c1")), 12, 4, 0).expect("nested");

        recompute_children_counts(&conn, None).expect("full");
        assert_eq!(posts::get(&conn, root.post_id).expect("get").children, 1);
        assert_eq!(posts::get(&conn, reply.post_id).expect("get").children, 1);
    }
}
