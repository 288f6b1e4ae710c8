//! Integration test: post lifecycle through the block processor.
//!
//! Create, edit, delete and re-create the same (author, permlink), and check
//! that broken feeds roll back whole blocks.

use hive_db::queries::{accounts, posts};
use hive_indexer::{feed_cache, BlockOutcome, IndexerError};
use hive_integration_tests::{op, Chain};
use hive_types::PostState;

#[test]
fn create_edit_delete_recreate() {
    let mut chain = Chain::new().expect("chain");
    chain.live(vec![op::create("alice")]).expect("accounts");
    let alice = accounts::find_id(chain.conn(), "alice")
        .expect("query")
        .expect("alice");

    chain.live(vec![op::post("alice", "foo", "tag")]).expect("create");
    let first = chain.post("alice", "foo").expect("query").expect("live post");
    assert_eq!(first.depth, 0);
    assert_eq!(first.parent_id, 0);
    assert_eq!(first.root_id, first.id, "root id is backfilled at range close");
    let feed = feed_cache::list_by_account(chain.conn(), alice, None, 10).expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].post_id, first.id);

    // Edit: same row, only activity moves.
    chain.live(vec![op::post("alice", "foo", "other")]).expect("edit");
    let edited = chain.post("alice", "foo").expect("query").expect("live post");
    assert_eq!(edited.id, first.id);
    assert_eq!(edited.created_at, first.created_at);
    assert!(edited.updated_at > first.updated_at);

    chain.live(vec![op::delete("alice", "foo")]).expect("delete");
    assert!(chain.post("alice", "foo").expect("query").is_none());
    let deleted = posts::get(chain.conn(), first.id).expect("deleted row");
    assert_eq!(deleted.state, PostState::Deleted(1));
    assert!(feed_cache::list_by_account(chain.conn(), alice, None, 10)
        .expect("feed")
        .is_empty());

    // Re-create under the same identity: a fresh row.
    chain.live(vec![op::post("alice", "foo", "tag")]).expect("recreate");
    let second = chain.post("alice", "foo").expect("query").expect("live post");
    assert_ne!(second.id, first.id);
    assert_eq!(second.state, PostState::Live);

    chain.live(vec![op::delete("alice", "foo")]).expect("delete again");
    let incarnations =
        posts::list_incarnations(chain.conn(), alice, second.permlink_id).expect("incarnations");
    let states: Vec<_> = incarnations.iter().map(|p| p.state).collect();
    assert_eq!(states, vec![PostState::Deleted(1), PostState::Deleted(2)]);
}

#[test]
fn delete_of_unknown_post_is_tolerated() {
    let mut chain = Chain::new().expect("chain");
    chain.live(vec![op::create("alice")]).expect("accounts");
    let outcome = chain
        .live(vec![op::delete("alice", "never-posted")])
        .expect("tolerated");
    assert_eq!(outcome, BlockOutcome::Applied { operations: 1 });
}

#[test]
fn missing_parent_rolls_back_the_block() {
    let mut chain = Chain::new().expect("chain");
    chain.live(vec![op::create("alice")]).expect("accounts");

    let result = chain.live(vec![
        op::create("bob"),
        op::post("alice", "foo", "tag"),
        op::reply("bob", "re", "alice", "missing"),
    ]);
    assert!(matches!(result, Err(IndexerError::Inconsistency(_))));
    assert_eq!(chain.indexer().head().expect("head"), Some(1));
    assert!(accounts::find_id(chain.conn(), "bob").expect("query").is_none());
    assert!(chain.post("alice", "foo").expect("query").is_none());

    // The same block number is accepted once the feed is fixed.
    chain
        .live(vec![op::create("bob"), op::post("alice", "foo", "tag")])
        .expect("fixed block");
    assert_eq!(chain.head(), 2);
}

#[test]
fn vote_on_missing_post_is_inconsistent() {
    let mut chain = Chain::new().expect("chain");
    chain
        .live(vec![op::create("alice"), op::create("bob")])
        .expect("accounts");
    let result = chain.live(vec![op::vote("bob", "alice", "nope", 10_000, Some(1))]);
    assert!(matches!(result, Err(IndexerError::Inconsistency(_))));
}

#[test]
fn reapplying_operations_changes_nothing() {
    let mut chain = Chain::new().expect("chain");
    let setup = vec![
        op::create("alice"),
        op::create("bob"),
        op::post("alice", "foo", "tag"),
        op::reply("bob", "re", "alice", "foo"),
        op::follow("bob", "alice", "blog"),
        op::reblog("bob", "alice", "foo"),
    ];
    chain.live(setup.clone()).expect("first pass");
    let counts = |chain: &Chain| {
        ["hive_accounts", "hive_posts", "hive_follows", "hive_reblogs", "hive_feed_cache", "hive_notifs"]
            .map(|table| chain.count(table).expect("count"))
    };
    let before = counts(&chain);

    // The same block again is skipped outright.
    assert_eq!(
        chain.replay(1, setup.clone()).expect("replay"),
        BlockOutcome::AlreadyApplied
    );
    // The same operations in a later block are upserts.
    chain.live(setup).expect("second pass");
    assert_eq!(counts(&chain), before);

    let alice = accounts::find_id(chain.conn(), "alice")
        .expect("query")
        .expect("alice");
    assert_eq!(accounts::get(chain.conn(), alice).expect("alice").followers, 1);
}

#[test]
fn votes_on_a_recreated_post_start_fresh() {
    let mut chain = Chain::new().expect("chain");
    chain
        .live(vec![
            op::create("alice"),
            op::create("bob"),
            op::post("alice", "foo", "tag"),
        ])
        .expect("setup");
    chain
        .live(vec![op::vote("bob", "alice", "foo", 10_000, Some(500))])
        .expect("vote");
    chain.live(vec![op::delete("alice", "foo")]).expect("delete");
    chain.live(vec![op::post("alice", "foo", "tag")]).expect("recreate");
    chain
        .live(vec![op::vote("bob", "alice", "foo", 10_000, Some(500))])
        .expect("vote again");

    let post = chain.post("alice", "foo").expect("query").expect("live post");
    assert_eq!(post.vote_rshares, 500);
    assert_eq!(post.abs_rshares, 500);
    assert_eq!(post.sc_hot, hive_scoring::hot(500, post.created_at));

    let votes =
        hive_indexer::votes::list_votes_by_post(chain.conn(), post.id, None, 10).expect("votes");
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].num_changes, 0);
}
