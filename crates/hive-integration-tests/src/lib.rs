//! Integration test support for the hive mirror.
//!
//! Tests drive a real [`Indexer`] over an in-memory store with synthetic
//! blocks, the way the block feed delivers them.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p hive-integration-tests
//! ```

use hive_db::queries::posts::{self, PostRow};
use hive_indexer::{BlockOutcome, Indexer, IndexerConfig};
use hive_types::{Block, Operation, SyncMode};
use rusqlite::Connection;

/// Timestamp of block 0; blocks follow every three seconds.
pub const GENESIS_TIME: u64 = 1_600_000_000;

/// Hex id of block `num`.
pub fn hash(num: u32) -> String {
    format!("{num:08x}{}", "0".repeat(32))
}

/// Block `num` linked to block `num - 1`.
pub fn block(num: u32, operations: Vec<Operation>) -> Block {
    Block {
        num,
        hash: hash(num),
        prev: (num > 1).then(|| hash(num - 1)),
        timestamp: GENESIS_TIME + u64::from(num) * hive_types::BLOCK_INTERVAL_SECS,
        operations,
    }
}

/// A synthetic chain feeding one indexer.
pub struct Chain {
    indexer: Indexer,
    next: u32,
}

impl Chain {
    pub fn new() -> hive_indexer::Result<Self> {
        Self::with_config(IndexerConfig::default())
    }

    pub fn with_config(config: IndexerConfig) -> hive_indexer::Result<Self> {
        let conn = hive_db::open_memory()?;
        Ok(Self {
            indexer: Indexer::new(conn, config),
            next: 1,
        })
    }

    /// Apply the next block in live mode.
    pub fn live(&mut self, operations: Vec<Operation>) -> hive_indexer::Result<BlockOutcome> {
        self.push(operations, SyncMode::Live)
    }

    /// Apply the next block in initial-sync mode.
    pub fn initial(&mut self, operations: Vec<Operation>) -> hive_indexer::Result<BlockOutcome> {
        self.push(operations, SyncMode::Initial)
    }

    pub fn push(
        &mut self,
        operations: Vec<Operation>,
        mode: SyncMode,
    ) -> hive_indexer::Result<BlockOutcome> {
        let outcome = self.indexer.process_block(&block(self.next, operations), mode)?;
        self.next += 1;
        Ok(outcome)
    }

    /// Replay an already applied block.
    pub fn replay(&mut self, num: u32, operations: Vec<Operation>) -> hive_indexer::Result<BlockOutcome> {
        self.indexer.process_block(&block(num, operations), SyncMode::Live)
    }

    /// Number of the last applied block.
    pub fn head(&self) -> u32 {
        self.next - 1
    }

    pub fn indexer(&mut self) -> &mut Indexer {
        &mut self.indexer
    }

    pub fn conn(&self) -> &Connection {
        self.indexer.conn()
    }

    /// Live post (author, permlink).
    pub fn post(&self, author: &str, permlink: &str) -> hive_db::Result<Option<PostRow>> {
        posts::find_live_by_name(self.conn(), author, permlink)
    }

    /// Rows in `table`.
    pub fn count(&self, table: &str) -> rusqlite::Result<i64> {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    }
}

/// Operation builders.
pub mod op {
    use hive_types::Operation;
    use serde_json::json;

    pub fn create(name: &str) -> Operation {
        Operation::AccountCreate { name: name.into() }
    }

    pub fn post(author: &str, permlink: &str, category: &str) -> Operation {
        Operation::Comment {
            author: author.into(),
            permlink: permlink.into(),
            parent_author: String::new(),
            parent_permlink: category.into(),
        }
    }

    pub fn reply(author: &str, permlink: &str, parent_author: &str, parent_permlink: &str) -> Operation {
        Operation::Comment {
            author: author.into(),
            permlink: permlink.into(),
            parent_author: parent_author.into(),
            parent_permlink: parent_permlink.into(),
        }
    }

    pub fn delete(author: &str, permlink: &str) -> Operation {
        Operation::DeleteComment {
            author: author.into(),
            permlink: permlink.into(),
        }
    }

    pub fn vote(voter: &str, author: &str, permlink: &str, weight: i32, rshares: Option<i64>) -> Operation {
        Operation::Vote {
            voter: voter.into(),
            author: author.into(),
            permlink: permlink.into(),
            weight,
            rshares,
        }
    }

    pub fn payout(author: &str, permlink: &str, pending_payout: f64) -> Operation {
        Operation::CommentPayoutUpdate {
            author: author.into(),
            permlink: permlink.into(),
            payout: 0.0,
            pending_payout,
            is_paidout: false,
        }
    }

    pub fn reputation(account: &str, reputation: f64) -> Operation {
        Operation::AccountReputation {
            account: account.into(),
            reputation,
        }
    }

    fn custom_json(id: &str, signer: &str, body: serde_json::Value) -> Operation {
        Operation::CustomJson {
            id: id.into(),
            required_posting_auths: vec![signer.into()],
            json: body.to_string(),
        }
    }

    /// `what` is "blog", "ignore", "" (reset) or a blacklist action.
    pub fn follow(follower: &str, following: &str, what: &str) -> Operation {
        let what: Vec<&str> = if what.is_empty() { vec![] } else { vec![what] };
        custom_json(
            "follow",
            follower,
            json!(["follow", {"follower": follower, "following": following, "what": what}]),
        )
    }

    pub fn reblog(account: &str, author: &str, permlink: &str) -> Operation {
        custom_json(
            "follow",
            account,
            json!(["reblog", {"account": account, "author": author, "permlink": permlink}]),
        )
    }

    pub fn unreblog(account: &str, author: &str, permlink: &str) -> Operation {
        custom_json(
            "follow",
            account,
            json!(["reblog", {"account": account, "author": author, "permlink": permlink, "delete": "delete"}]),
        )
    }

    pub fn subscribe(account: &str, community: &str) -> Operation {
        custom_json("community", account, json!(["subscribe", {"community": community}]))
    }
}
