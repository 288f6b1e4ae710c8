//! Ledger operations as delivered by the upstream feed.
//!
//! Only the operations the mirror reacts to are modelled. `custom_json`
//! keeps its body as a raw JSON string; its inner payloads (follow, reblog,
//! community) are validated by their handlers, since malformed custom JSON
//! is valid on chain and must be tolerated.

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// One operation inside a block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Operation {
    AccountCreate {
        name: String,
    },
    Comment {
        author: String,
        permlink: String,
        #[serde(default)]
        parent_author: String,
        parent_permlink: String,
    },
    DeleteComment {
        author: String,
        permlink: String,
    },
    Vote {
        voter: String,
        author: String,
        permlink: String,
        /// Vote percent in basis points (-10000..=10000).
        weight: i32,
        /// Present only on effective votes.
        #[serde(default)]
        rshares: Option<i64>,
    },
    CommentPayoutUpdate {
        author: String,
        permlink: String,
        payout: f64,
        pending_payout: f64,
        #[serde(default)]
        is_paidout: bool,
    },
    AccountReputation {
        account: String,
        reputation: f64,
    },
    CustomJson {
        id: String,
        #[serde(default)]
        required_posting_auths: Vec<String>,
        json: String,
    },
}

impl Operation {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AccountCreate { .. } => "account_create",
            Operation::Comment { .. } => "comment",
            Operation::DeleteComment { .. } => "delete_comment",
            Operation::Vote { .. } => "vote",
            Operation::CommentPayoutUpdate { .. } => "comment_payout_update",
            Operation::AccountReputation { .. } => "account_reputation",
            Operation::CustomJson { .. } => "custom_json",
        }
    }
}

/// Split a custom_json body of the form `["action", {...}]`.
///
/// A bare object is accepted as the payload of `default_action`.
pub fn split_custom_json(
    json: &str,
    default_action: &str,
) -> Result<(String, serde_json::Value), TypeError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| TypeError::Payload(e.to_string()))?;
    match value {
        serde_json::Value::Array(mut items) if items.len() == 2 => {
            let payload = items.pop().unwrap_or(serde_json::Value::Null);
            let action = items
                .pop()
                .and_then(|a| a.as_str().map(str::to_string))
                .ok_or_else(|| TypeError::Payload("action is not a string".into()))?;
            Ok((action, payload))
        }
        serde_json::Value::Object(_) => Ok((default_action.to_string(), value)),
        _ => Err(TypeError::Payload("expected [action, payload]".into())),
    }
}
