//! Post query functions.
//!
//! A post is identified by (author_id, permlink_id, counter_deleted). At most
//! one row per (author, permlink) is live (`counter_deleted = 0`); deleted
//! incarnations are kept with increasing counters.

use hive_types::{PostState, PAYOUT_WINDOW_SECS};
use rusqlite::{Connection, Row};

use crate::{optional, DbError, Result};

const POST_COLUMNS: &str = "hp.id, hp.root_id, hp.parent_id, hp.author_id, hp.permlink_id,
     hp.category_id, hp.community_id, hp.depth, hp.counter_deleted, hp.is_muted,
     hp.is_valid, hp.children, hp.created_at, hp.updated_at, hp.payout,
     hp.pending_payout, hp.is_paidout, hp.abs_rshares, hp.vote_rshares,
     hp.sc_hot, hp.sc_trend, hp.block_num";

fn map_post(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        root_id: row.get(1)?,
        parent_id: row.get(2)?,
        author_id: row.get(3)?,
        permlink_id: row.get(4)?,
        category_id: row.get(5)?,
        community_id: row.get(6)?,
        depth: row.get(7)?,
        state: PostState::from_counter(row.get(8)?),
        is_muted: row.get(9)?,
        is_valid: row.get(10)?,
        children: row.get(11)?,
        created_at: row.get::<_, i64>(12)? as u64,
        updated_at: row.get::<_, i64>(13)? as u64,
        payout: row.get(14)?,
        pending_payout: row.get(15)?,
        is_paidout: row.get(16)?,
        abs_rshares: row.get(17)?,
        vote_rshares: row.get(18)?,
        sc_hot: row.get(19)?,
        sc_trend: row.get(20)?,
        block_num: row.get::<_, i64>(21)? as u32,
    })
}

/// Fields of a post row fixed at creation.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub parent_id: i64,
    pub root_id: i64,
    pub author_id: i64,
    pub permlink_id: i64,
    pub category_id: i64,
    pub community_id: Option<i64>,
    pub depth: i64,
    pub is_muted: bool,
    pub is_valid: bool,
    pub created_at: u64,
    pub sc_hot: f64,
    pub sc_trend: f64,
    pub block_num: u32,
}

/// Insert a new live post. Returns its id.
pub fn insert(conn: &Connection, post: &NewPost) -> Result<i64> {
    let created_at = post.created_at as i64;
    let cashout = (post.created_at + PAYOUT_WINDOW_SECS) as i64;
    conn.execute(
        "INSERT INTO hive_posts
         (parent_id, root_id, author_id, permlink_id, category_id, community_id,
          depth, is_muted, is_valid, created_at, updated_at, active,
          payout_at, cashout_time, sc_hot, sc_trend, block_num, last_block_num)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10, ?10, ?11, ?11, ?12, ?13, ?14, ?14)",
        rusqlite::params![
            post.parent_id,
            post.root_id,
            post.author_id,
            post.permlink_id,
            post.category_id,
            post.community_id,
            post.depth,
            post.is_muted,
            post.is_valid,
            created_at,
            cashout,
            post.sc_hot,
            post.sc_trend,
            post.block_num,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint(msg.unwrap_or_else(|| "hive_posts".into()))
        }
        other => DbError::Sqlite(other),
    })?;
    Ok(conn.last_insert_rowid())
}

/// Get a post by id, live or deleted.
pub fn get(conn: &Connection, id: i64) -> Result<PostRow> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM hive_posts hp WHERE hp.id = ?1"),
        [id],
        map_post,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("post {id}")),
        other => DbError::Sqlite(other),
    })
}

/// Find the live post for (author_id, permlink_id).
pub fn find_live(conn: &Connection, author_id: i64, permlink_id: i64) -> Result<Option<PostRow>> {
    optional(conn.query_row(
        &format!(
            "SELECT {POST_COLUMNS} FROM hive_posts hp
             WHERE hp.author_id = ?1 AND hp.permlink_id = ?2 AND hp.counter_deleted = 0"
        ),
        [author_id, permlink_id],
        map_post,
    ))
}

/// Find the live post for (author, permlink) by name.
pub fn find_live_by_name(
    conn: &Connection,
    author: &str,
    permlink: &str,
) -> Result<Option<PostRow>> {
    optional(conn.query_row(
        &format!(
            "SELECT {POST_COLUMNS} FROM hive_posts hp
             JOIN hive_accounts ha ON ha.id = hp.author_id
             JOIN hive_permlink_data hpd ON hpd.id = hp.permlink_id
             WHERE ha.name = ?1 AND hpd.permlink = ?2 AND hp.counter_deleted = 0"
        ),
        [author, permlink],
        map_post,
    ))
}

/// Every incarnation of (author_id, permlink_id), oldest first.
pub fn list_incarnations(
    conn: &Connection,
    author_id: i64,
    permlink_id: i64,
) -> Result<Vec<PostRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM hive_posts hp
         WHERE hp.author_id = ?1 AND hp.permlink_id = ?2
         ORDER BY hp.id"
    ))?;
    let rows = stmt
        .query_map([author_id, permlink_id], map_post)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Record an edit: only the activity timestamps move.
pub fn touch(conn: &Connection, id: i64, updated_at: u64, block_num: u32) -> Result<()> {
    conn.execute(
        "UPDATE hive_posts SET updated_at = ?1, active = ?1, last_block_num = ?2 WHERE id = ?3",
        rusqlite::params![updated_at as i64, block_num, id],
    )?;
    Ok(())
}

/// Highest `counter_deleted` used so far for (author_id, permlink_id).
pub fn max_counter_deleted(conn: &Connection, author_id: i64, permlink_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(counter_deleted), 0) FROM hive_posts
         WHERE author_id = ?1 AND permlink_id = ?2",
        [author_id, permlink_id],
        |row| row.get(0),
    )
    .map_err(DbError::Sqlite)
}

/// Move a live post into the given deleted state.
pub fn mark_deleted(conn: &Connection, id: i64, state: PostState, block_num: u32) -> Result<()> {
    let updated = conn.execute(
        "UPDATE hive_posts SET counter_deleted = ?1, last_block_num = ?2
         WHERE id = ?3 AND counter_deleted = 0",
        rusqlite::params![state.counter(), block_num, id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("live post {id}")));
    }
    Ok(())
}

/// Store payout figures reported for a post.
pub fn update_payout(
    conn: &Connection,
    id: i64,
    payout: f64,
    pending_payout: f64,
    is_paidout: bool,
) -> Result<()> {
    conn.execute(
        "UPDATE hive_posts SET payout = ?1, pending_payout = ?2, is_paidout = ?3 WHERE id = ?4",
        rusqlite::params![payout, pending_payout, is_paidout, id],
    )?;
    Ok(())
}

/// Add vote deltas to a post's net and absolute rshares.
///
/// Returns the new net rshares.
pub fn apply_vote_delta(conn: &Connection, id: i64, net_delta: i64, abs_delta: i64) -> Result<i64> {
    conn.query_row(
        "UPDATE hive_posts
         SET vote_rshares = vote_rshares + ?1, abs_rshares = abs_rshares + ?2
         WHERE id = ?3
         RETURNING vote_rshares",
        rusqlite::params![net_delta, abs_delta, id],
        |row| row.get(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("post {id}")),
        other => DbError::Sqlite(other),
    })
}

/// Store freshly computed ranking scores.
pub fn set_scores(conn: &Connection, id: i64, sc_hot: f64, sc_trend: f64) -> Result<()> {
    conn.execute(
        "UPDATE hive_posts SET sc_hot = ?1, sc_trend = ?2 WHERE id = ?3",
        rusqlite::params![sc_hot, sc_trend, id],
    )?;
    Ok(())
}

/// A raw post row.
#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub root_id: i64,
    pub parent_id: i64,
    pub author_id: i64,
    pub permlink_id: i64,
    pub category_id: i64,
    pub community_id: Option<i64>,
    pub depth: i64,
    pub state: PostState,
    pub is_muted: bool,
    pub is_valid: bool,
    pub children: i64,
    pub created_at: u64,
    pub updated_at: u64,
    pub payout: f64,
    pub pending_payout: f64,
    pub is_paidout: bool,
    pub abs_rshares: i64,
    pub vote_rshares: i64,
    pub sc_hot: f64,
    pub sc_trend: f64,
    pub block_num: u32,
}
