//! Persisted notifications and reads from the unified notification view.

use rusqlite::Connection;
use serde::Serialize;

use crate::Result;

/// A notification written explicitly by the indexer.
#[derive(Debug, Clone)]
pub struct NewNotif {
    pub block_num: u32,
    pub type_id: u8,
    pub score: i32,
    pub created_at: u64,
    pub src_id: Option<i64>,
    pub dst_id: Option<i64>,
    pub post_id: Option<i64>,
    pub community_id: Option<i64>,
    pub payload: Option<String>,
}

/// Persist a notification.
///
/// Notifications about a post are emitted at most once per
/// (type, src, dst, post); a repeat is ignored. Returns `true` when stored.
pub fn insert(conn: &Connection, notif: &NewNotif) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO hive_notifs
         (block_num, type_id, score, created_at, src_id, dst_id, post_id, community_id, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            notif.block_num,
            notif.type_id,
            notif.score,
            notif.created_at as i64,
            notif.src_id,
            notif.dst_id,
            notif.post_id,
            notif.community_id,
            notif.payload,
        ],
    )?;
    Ok(inserted > 0)
}

/// Which side of the view a fetch filters on.
#[derive(Debug, Clone, Copy)]
pub enum NotifTarget {
    Account(i64),
    Post(i64),
}

/// Read the unified notification view, newest first.
///
/// Rows are limited to `block_num > min_block`, `score >= min_score` and,
/// when `last_id` is set, `id < last_id`.
pub fn fetch(
    conn: &Connection,
    target: NotifTarget,
    min_block: u32,
    min_score: i32,
    last_id: Option<i64>,
    limit: u32,
) -> Result<Vec<NotifRow>> {
    let filter = match target {
        NotifTarget::Account(_) => "hnv.dst_id = ?1",
        NotifTarget::Post(_) => "hnv.post_id = ?1",
    };
    let target_id = match target {
        NotifTarget::Account(id) | NotifTarget::Post(id) => id,
    };
    let sql = format!(
        "SELECT hnv.id, hnv.type_id, hnv.block_num, hnv.created_at, hnv.score,
                src.name, dst.name, author.name, hpd.permlink, hc.name, hnv.payload
         FROM hive_notifications_view hnv
         LEFT JOIN hive_accounts src ON src.id = hnv.src_id
         LEFT JOIN hive_accounts dst ON dst.id = hnv.dst_id
         LEFT JOIN hive_posts hp ON hp.id = hnv.post_id
         LEFT JOIN hive_accounts author ON author.id = hp.author_id
         LEFT JOIN hive_permlink_data hpd ON hpd.id = hp.permlink_id
         LEFT JOIN hive_communities hc ON hc.id = hnv.community_id
         WHERE {filter}
           AND hnv.block_num > ?2
           AND hnv.score >= ?3
           AND (?4 IS NULL OR hnv.id < ?4)
         ORDER BY hnv.id DESC
         LIMIT ?5"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            rusqlite::params![target_id, min_block, min_score, last_id, limit],
            |row| {
                Ok(NotifRow {
                    id: row.get(0)?,
                    type_id: row.get(1)?,
                    block_num: row.get::<_, i64>(2)? as u32,
                    created_at: row.get::<_, i64>(3)? as u64,
                    score: row.get(4)?,
                    src: row.get(5)?,
                    dst: row.get(6)?,
                    author: row.get(7)?,
                    permlink: row.get(8)?,
                    community: row.get(9)?,
                    payload: row.get(10)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// One notification as read from the view, with names resolved.
#[derive(Debug, Clone, Serialize)]
pub struct NotifRow {
    pub id: i64,
    pub type_id: i64,
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
