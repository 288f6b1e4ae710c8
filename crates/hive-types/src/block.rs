//! Upstream block feed structures.

use serde::{Deserialize, Serialize};

use crate::{BlockNum, Operation};

/// A block as delivered by the upstream feed, already in canonical order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub num: BlockNum,
    /// Hex-encoded block id (20 bytes).
    pub hash: String,
    /// Hex-encoded id of the previous block. `None` only for the first block
    /// ever stored.
    #[serde(default)]
    pub prev: Option<String>,
    /// Unix epoch seconds.
    pub timestamp: u64,
    /// Operations in recorded transaction order.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Sync mode the feed tags each block with.
///
/// Initial sync is the bulk backfill: notification emission is suppressed
/// and batch jobs run over wide block ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Initial,
    Live,
}

impl SyncMode {
    pub fn is_initial(self) -> bool {
        matches!(self, SyncMode::Initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_from_json() {
        let json = r#"{
            "num": 7,
            "hash": "0000000700000000000000000000000000000000",
            "prev": "0000000600000000000000000000000000000000",
            "timestamp": 1600000000,
            "operations": [
                {"type": "account_create", "value": {"name": "alice"}}
            ]
        }"#;
        let block: Block = serde_json::from_str(json).expect("parse block");
        assert_eq!(block.num, 7);
        assert_eq!(block.operations.len(), 1);
        assert!(block.prev.is_some());
    }

    #[test]
    fn test_block_defaults() {
        let json = r#"{"num": 1, "hash": "00", "timestamp": 0}"#;
        let block: Block = serde_json::from_str(json).expect("parse block");
        assert!(block.prev.is_none());
        assert!(block.operations.is_empty());
    }

    #[test]
    fn test_sync_mode() {
        assert!(SyncMode::Initial.is_initial());
        assert!(!SyncMode::Live.is_initial());
    }
}
