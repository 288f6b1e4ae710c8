//! Integration test: reblog buffering, flush, delete and feed cache.

use hive_db::queries::accounts;
use hive_indexer::{feed_cache, notify};
use hive_integration_tests::{op, Chain};
use hive_types::NotifyType;

fn setup() -> Chain {
    let mut chain = Chain::new().expect("chain");
    chain
        .live(vec![
            op::create("alice"),
            op::create("bob"),
            op::post("alice", "foo", "tag"),
            op::reply("bob", "re", "alice", "foo"),
        ])
        .expect("setup");
    chain
}

fn bob_feed(chain: &Chain) -> Vec<feed_cache::FeedEntry> {
    let bob = accounts::find_id(chain.conn(), "bob")
        .expect("query")
        .expect("bob");
    feed_cache::list_by_account(chain.conn(), bob, None, 10).expect("feed")
}

#[test]
fn reblog_then_delete() {
    let mut chain = setup();
    chain.live(vec![op::reblog("bob", "alice", "foo")]).expect("reblog");
    let foo = chain.post("alice", "foo").expect("query").expect("foo");

    assert_eq!(chain.count("hive_reblogs").expect("count"), 1);
    let feed = bob_feed(&chain);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].post_id, foo.id);

    let notifs = notify::fetch_by_account(chain.conn(), "alice", 0, None, 10).expect("notifs");
    let reblogs: Vec<_> = notifs
        .iter()
        .filter(|n| n.kind == NotifyType::Reblog)
        .collect();
    assert_eq!(reblogs.len(), 1, "persisted and stored reblog notify once");
    assert_eq!(reblogs[0].src.as_deref(), Some("bob"));
    assert_eq!(reblogs[0].permlink.as_deref(), Some("foo"));

    let notifs_before = chain.count("hive_notifs").expect("count");
    chain.live(vec![op::unreblog("bob", "alice", "foo")]).expect("delete");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
    assert!(bob_feed(&chain).is_empty());
    assert_eq!(chain.count("hive_notifs").expect("count"), notifs_before);
}

#[test]
fn delete_of_reblog_queued_in_the_same_range() {
    let mut chain = Chain::new().expect("chain");
    chain
        .initial(vec![
            op::create("alice"),
            op::create("bob"),
            op::post("alice", "foo", "tag"),
        ])
        .expect("setup");
    chain.initial(vec![op::reblog("bob", "alice", "foo")]).expect("reblog");
    assert_eq!(chain.indexer().pending_reblogs(), 1);

    chain.initial(vec![op::unreblog("bob", "alice", "foo")]).expect("delete");
    assert_eq!(chain.indexer().pending_reblogs(), 0);
    chain.indexer().finish().expect("finish");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
    assert!(bob_feed(&chain).is_empty());
}

#[test]
fn duplicate_reblogs_collapse() {
    let mut chain = setup();
    chain
        .live(vec![
            op::reblog("bob", "alice", "foo"),
            op::reblog("bob", "alice", "foo"),
        ])
        .expect("same block");
    chain.live(vec![op::reblog("bob", "alice", "foo")]).expect("later block");

    assert_eq!(chain.count("hive_reblogs").expect("count"), 1);
    assert_eq!(bob_feed(&chain).len(), 1);
    assert_eq!(chain.count("hive_notifs").expect("count"), 1);
}

#[test]
fn initial_sync_buffers_without_notifying() {
    let mut chain = Chain::new().expect("chain");
    chain
        .initial(vec![
            op::create("alice"),
            op::create("bob"),
            op::create("carol"),
            op::post("alice", "foo", "tag"),
        ])
        .expect("setup");
    chain
        .initial(vec![
            op::reblog("bob", "alice", "foo"),
            op::reblog("carol", "alice", "foo"),
        ])
        .expect("reblogs");

    assert_eq!(chain.indexer().pending_reblogs(), 2);
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
    // The feed cache is updated at once.
    assert_eq!(bob_feed(&chain).len(), 1);

    chain.indexer().finish().expect("finish");
    assert_eq!(chain.indexer().pending_reblogs(), 0);
    assert_eq!(chain.count("hive_reblogs").expect("count"), 2);
    assert_eq!(chain.count("hive_notifs").expect("count"), 0);
}

#[test]
fn only_live_root_posts_can_be_reblogged() {
    let mut chain = setup();
    chain
        .live(vec![
            op::reblog("bob", "alice", "re"),
            op::reblog("alice", "bob", "re"),
            op::reblog("bob", "alice", "missing"),
        ])
        .expect("tolerated");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);

    chain.live(vec![op::delete("alice", "foo")]).expect("delete post");
    chain.live(vec![op::reblog("bob", "alice", "foo")]).expect("tolerated");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
    assert!(bob_feed(&chain).is_empty());
}

#[test]
fn feed_lists_newest_first_with_cursor() {
    let mut chain = setup();
    chain.live(vec![op::post("alice", "bar", "tag")]).expect("bar");
    chain.live(vec![op::post("alice", "baz", "tag")]).expect("baz");
    chain.live(vec![op::reblog("bob", "alice", "foo")]).expect("reblog foo");
    chain.live(vec![op::reblog("bob", "alice", "baz")]).expect("reblog baz");
    chain.live(vec![op::post("bob", "own", "tag")]).expect("own post");

    let feed = bob_feed(&chain);
    let ids: Vec<_> = feed.iter().map(|e| e.post_id).collect();
    let own = chain.post("bob", "own").expect("query").expect("own").id;
    let baz = chain.post("alice", "baz").expect("query").expect("baz").id;
    let foo = chain.post("alice", "foo").expect("query").expect("foo").id;
    assert_eq!(ids, vec![own, baz, foo]);

    let bob = accounts::find_id(chain.conn(), "bob")
        .expect("query")
        .expect("bob");
    let page = feed_cache::list_by_account(chain.conn(), bob, Some((feed[0].created_at, own)), 1)
        .expect("page");
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].post_id, baz);
}

#[test]
fn deleting_a_post_drops_its_reblogs() {
    let mut chain = setup();
    chain.live(vec![op::reblog("bob", "alice", "foo")]).expect("reblog");
    chain.live(vec![op::delete("alice", "foo")]).expect("delete post");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
    assert!(bob_feed(&chain).is_empty());

    // The re-created post starts without reblogs and can be reblogged and
    // un-reblogged again.
    chain.live(vec![op::post("alice", "foo", "tag")]).expect("recreate");
    assert!(bob_feed(&chain).is_empty());
    chain.live(vec![op::reblog("bob", "alice", "foo")]).expect("reblog again");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 1);
    chain.live(vec![op::unreblog("bob", "alice", "foo")]).expect("unreblog");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
}

#[test]
fn deleting_a_post_drops_queued_reblogs() {
    let mut chain = Chain::new().expect("chain");
    chain
        .initial(vec![
            op::create("alice"),
            op::create("bob"),
            op::post("alice", "foo", "tag"),
        ])
        .expect("setup");
    chain.initial(vec![op::reblog("bob", "alice", "foo")]).expect("reblog");
    assert_eq!(chain.indexer().pending_reblogs(), 1);

    chain.initial(vec![op::delete("alice", "foo")]).expect("delete post");
    assert_eq!(chain.indexer().pending_reblogs(), 0);
    chain.indexer().finish().expect("finish");
    assert_eq!(chain.count("hive_reblogs").expect("count"), 0);
}
