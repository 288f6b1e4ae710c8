//! SQL schema definitions.
//!
//! Conventions: all timestamps are Unix epoch seconds, booleans are 0/1
//! integers, and post id 0 means "no post" (`parent_id` of a root post,
//! `root_id` before backfill), so those two columns carry no foreign key.

/// Complete schema for the v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Blocks
-- ============================================================

CREATE TABLE IF NOT EXISTS hive_blocks (
    num INTEGER PRIMARY KEY,
    hash TEXT NOT NULL UNIQUE,
    prev TEXT REFERENCES hive_blocks(hash),
    created_at INTEGER NOT NULL
);

-- ============================================================
-- Accounts & Communities
-- ============================================================

CREATE TABLE IF NOT EXISTS hive_accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    reputation REAL NOT NULL DEFAULT 25.0,
    followers INTEGER NOT NULL DEFAULT 0,
    following INTEGER NOT NULL DEFAULT 0,
    rank INTEGER NOT NULL DEFAULT 0,
    block_num INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS hive_accounts_reputation_idx ON hive_accounts(reputation);

CREATE TABLE IF NOT EXISTS hive_communities (
    id INTEGER PRIMARY KEY REFERENCES hive_accounts(id),
    type_id INTEGER NOT NULL DEFAULT 1,
    name TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL DEFAULT '',
    subscribers INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    block_num INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS hive_subscriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id INTEGER NOT NULL REFERENCES hive_accounts(id),
    community_id INTEGER NOT NULL REFERENCES hive_communities(id),
    created_at INTEGER NOT NULL,
    block_num INTEGER NOT NULL,
    UNIQUE (account_id, community_id)
);

CREATE INDEX IF NOT EXISTS hive_subscriptions_block_num_idx ON hive_subscriptions(block_num);

-- ============================================================
-- Interned strings
-- ============================================================

CREATE TABLE IF NOT EXISTS hive_permlink_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    permlink TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS hive_category_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL UNIQUE
);

-- ============================================================
-- Posts
-- ============================================================

CREATE TABLE IF NOT EXISTS hive_posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    root_id INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER NOT NULL DEFAULT 0,
    author_id INTEGER NOT NULL REFERENCES hive_accounts(id),
    permlink_id INTEGER NOT NULL REFERENCES hive_permlink_data(id),
    category_id INTEGER NOT NULL REFERENCES hive_category_data(id),
    community_id INTEGER REFERENCES hive_communities(id),
    depth INTEGER NOT NULL,
    counter_deleted INTEGER NOT NULL DEFAULT 0,
    is_muted INTEGER NOT NULL DEFAULT 0,
    is_valid INTEGER NOT NULL DEFAULT 1,
    children INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    active INTEGER NOT NULL,
    payout_at INTEGER NOT NULL,
    cashout_time INTEGER NOT NULL,
    payout REAL NOT NULL DEFAULT 0.0,
    pending_payout REAL NOT NULL DEFAULT 0.0,
    is_paidout INTEGER NOT NULL DEFAULT 0,
    abs_rshares INTEGER NOT NULL DEFAULT 0,
    vote_rshares INTEGER NOT NULL DEFAULT 0,
    sc_hot REAL NOT NULL DEFAULT 0.0,
    sc_trend REAL NOT NULL DEFAULT 0.0,
    block_num INTEGER NOT NULL,
    last_block_num INTEGER NOT NULL,
    UNIQUE (author_id, permlink_id, counter_deleted)
);

CREATE INDEX IF NOT EXISTS hive_posts_parent_id_idx ON hive_posts(parent_id);
CREATE INDEX IF NOT EXISTS hive_posts_root_id_idx ON hive_posts(root_id, id);
CREATE INDEX IF NOT EXISTS hive_posts_block_num_idx ON hive_posts(block_num);
CREATE INDEX IF NOT EXISTS hive_posts_last_block_num_idx ON hive_posts(last_block_num);
CREATE INDEX IF NOT EXISTS hive_posts_community_id_idx ON hive_posts(community_id);
CREATE INDEX IF NOT EXISTS hive_posts_sc_hot_idx ON hive_posts(sc_hot);
CREATE INDEX IF NOT EXISTS hive_posts_sc_trend_idx ON hive_posts(sc_trend);

-- ============================================================
-- Votes, Follows, Reblogs
-- ============================================================

CREATE TABLE IF NOT EXISTS hive_votes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL REFERENCES hive_posts(id),
    voter_id INTEGER NOT NULL REFERENCES hive_accounts(id),
    author_id INTEGER NOT NULL REFERENCES hive_accounts(id),
    permlink_id INTEGER NOT NULL REFERENCES hive_permlink_data(id),
    rshares INTEGER NOT NULL DEFAULT 0,
    vote_percent INTEGER NOT NULL DEFAULT 0,
    is_effective INTEGER NOT NULL DEFAULT 0,
    last_update INTEGER NOT NULL,
    num_changes INTEGER NOT NULL DEFAULT 0,
    block_num INTEGER NOT NULL,
    UNIQUE (voter_id, author_id, permlink_id)
);

CREATE INDEX IF NOT EXISTS hive_votes_post_id_voter_id_idx ON hive_votes(post_id, voter_id);
CREATE INDEX IF NOT EXISTS hive_votes_voter_id_post_id_idx ON hive_votes(voter_id, post_id);
CREATE INDEX IF NOT EXISTS hive_votes_block_num_idx ON hive_votes(block_num);

CREATE TABLE IF NOT EXISTS hive_follows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    follower INTEGER NOT NULL REFERENCES hive_accounts(id),
    following INTEGER NOT NULL REFERENCES hive_accounts(id),
    state INTEGER NOT NULL DEFAULT 1,
    blacklisted INTEGER NOT NULL DEFAULT 0,
    follow_blacklists INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    block_num INTEGER NOT NULL,
    UNIQUE (following, follower)
);

CREATE INDEX IF NOT EXISTS hive_follows_follower_idx ON hive_follows(follower, state);
CREATE INDEX IF NOT EXISTS hive_follows_block_num_idx ON hive_follows(block_num);

CREATE TABLE IF NOT EXISTS hive_reblogs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    blogger_id INTEGER NOT NULL REFERENCES hive_accounts(id),
    post_id INTEGER NOT NULL REFERENCES hive_posts(id),
    created_at INTEGER NOT NULL,
    block_num INTEGER NOT NULL,
    UNIQUE (blogger_id, post_id)
);

CREATE INDEX IF NOT EXISTS hive_reblogs_post_id_idx ON hive_reblogs(post_id);
CREATE INDEX IF NOT EXISTS hive_reblogs_block_num_idx ON hive_reblogs(block_num);

-- ============================================================
-- Read projections
-- ============================================================

CREATE TABLE IF NOT EXISTS hive_feed_cache (
    post_id INTEGER NOT NULL,
    account_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    block_num INTEGER NOT NULL,
    PRIMARY KEY (account_id, post_id)
);

CREATE INDEX IF NOT EXISTS hive_feed_cache_post_id_idx ON hive_feed_cache(post_id);
CREATE INDEX IF NOT EXISTS hive_feed_cache_created_at_idx ON hive_feed_cache(account_id, created_at);

CREATE TABLE IF NOT EXISTS hive_notifs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    block_num INTEGER NOT NULL,
    type_id INTEGER NOT NULL,
    score INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    src_id INTEGER,
    dst_id INTEGER,
    post_id INTEGER,
    community_id INTEGER,
    payload TEXT
);

CREATE INDEX IF NOT EXISTS hive_notifs_dst_idx ON hive_notifs(dst_id, id);
CREATE UNIQUE INDEX IF NOT EXISTS hive_notifs_dedupe_ux
    ON hive_notifs(type_id, src_id, dst_id, post_id) WHERE post_id IS NOT NULL;

-- ============================================================
-- Derived views
-- ============================================================

CREATE VIEW IF NOT EXISTS hive_accounts_rank_view AS
SELECT ranked.id AS id, reputation_bucket(ranked.position) AS score
FROM (
    SELECT ha.id AS id, RANK() OVER (ORDER BY ha.reputation DESC) AS position
    FROM hive_accounts ha
) AS ranked;

CREATE VIEW IF NOT EXISTS hive_notifications_view AS
-- replies and comment replies, unless the parent author muted the replier
SELECT
    hp.block_num AS block_num,
    notification_id(hp.block_num, CASE hp.depth WHEN 1 THEN 12 ELSE 13 END, hp.id) AS id,
    CASE hp.depth WHEN 1 THEN 12 ELSE 13 END AS type_id,
    hp.created_at AS created_at,
    hp.author_id AS src_id,
    pp.author_id AS dst_id,
    pp.id AS post_id,
    NULL AS community_id,
    NULL AS payload,
    rv.score AS score
FROM hive_posts hp
JOIN hive_posts pp ON pp.id = hp.parent_id
JOIN hive_accounts_rank_view rv ON rv.id = hp.author_id
WHERE hp.depth > 0 AND hp.counter_deleted = 0
  AND NOT EXISTS (
      SELECT 1 FROM hive_follows hf
      WHERE hf.follower = pp.author_id AND hf.following = hp.author_id AND hf.state = 2
  )

UNION ALL
-- new followers
SELECT
    hf.block_num,
    notification_id(hf.block_num, 15, hf.id),
    15,
    hf.created_at,
    hf.follower,
    hf.following,
    NULL,
    NULL,
    NULL,
    rv.score
FROM hive_follows hf
JOIN hive_accounts_rank_view rv ON rv.id = hf.follower
WHERE hf.state = 1

UNION ALL
-- reblogs of live posts not already covered by a persisted reblog notification
SELECT
    hr.block_num,
    notification_id(hr.block_num, 14, hr.id),
    14,
    hr.created_at,
    hr.blogger_id,
    hp.author_id,
    hp.id,
    NULL,
    NULL,
    rv.score
FROM hive_reblogs hr
JOIN hive_posts hp ON hp.id = hr.post_id
JOIN hive_accounts_rank_view rv ON rv.id = hr.blogger_id
WHERE hp.counter_deleted = 0 AND NOT EXISTS (
    SELECT 1 FROM hive_notifs hn
    WHERE hn.type_id = 14 AND hn.src_id = hr.blogger_id AND hn.post_id = hr.post_id
)

UNION ALL
-- community subscriptions
SELECT
    hs.block_num,
    notification_id(hs.block_num, 11, hs.id),
    11,
    hs.created_at,
    hs.account_id,
    hs.community_id,
    NULL,
    hs.community_id,
    NULL,
    rv.score
FROM hive_subscriptions hs
JOIN hive_accounts_rank_view rv ON rv.id = hs.account_id

UNION ALL
-- new communities
SELECT
    hc.block_num,
    notification_id(hc.block_num, 1, hc.id),
    1,
    hc.created_at,
    NULL,
    hc.id,
    NULL,
    hc.id,
    NULL,
    35
FROM hive_communities hc

UNION ALL
-- qualifying votes on live posts
SELECT
    hv.block_num,
    notification_id(hv.block_num, 17, hv.id),
    17,
    hv.last_update,
    hv.voter_id,
    hp.author_id,
    hp.id,
    NULL,
    NULL,
    notify_vote_score(hp.payout + hp.pending_payout, hp.abs_rshares, hv.rshares)
FROM hive_votes hv
JOIN hive_posts hp ON hp.id = hv.post_id
WHERE hv.rshares >= 10000000000 AND hp.abs_rshares != 0 AND hp.counter_deleted = 0
  AND notify_vote_score(hp.payout + hp.pending_payout, hp.abs_rshares, hv.rshares) > 0

UNION ALL
-- persisted notifications, dropped once their post is deleted
SELECT
    hn.block_num,
    notification_id(hn.block_num, hn.type_id, hn.id),
    hn.type_id,
    hn.created_at,
    hn.src_id,
    hn.dst_id,
    hn.post_id,
    hn.community_id,
    hn.payload,
    hn.score
FROM hive_notifs hn
LEFT JOIN hive_posts hp ON hp.id = hn.post_id
WHERE hn.post_id IS NULL OR hp.counter_deleted = 0;
"#;

/// Every table created by [`SCHEMA_V1`].
pub const TABLES: &[&str] = &[
    "hive_blocks",
    "hive_accounts",
    "hive_communities",
    "hive_subscriptions",
    "hive_permlink_data",
    "hive_category_data",
    "hive_posts",
    "hive_votes",
    "hive_follows",
    "hive_reblogs",
    "hive_feed_cache",
    "hive_notifs",
];
