//! Notification types and id packing.
//!
//! Notification ids are not taken from a sequence: they are packed from the
//! block number, the notification type and the id of the row the event was
//! derived from, so that ordering by id orders by block first.
//!
//! ```text
//! bits 63..32  block_num
//! bits 31..24  type_id
//! bits 23..0   source row id (masked)
//! ```

use serde::{Deserialize, Serialize};

use crate::{BlockNum, TypeError};

/// Bit offset of the type field.
pub const TYPE_SHIFT: u32 = 24;

/// Mask applied to the source row id.
pub const SOURCE_MASK: i64 = 0x00FF_FFFF;

/// Notification kinds with their persisted type ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyType {
    NewCommunity,
    SetRole,
    SetProps,
    SetLabel,
    MutePost,
    UnmutePost,
    PinPost,
    UnpinPost,
    FlagPost,
    Error,
    Subscribe,
    Reply,
    ReplyComment,
    Reblog,
    Follow,
    Mention,
    Vote,
}

impl NotifyType {
    pub fn id(self) -> u8 {
        match self {
            NotifyType::NewCommunity => 1,
            NotifyType::SetRole => 2,
            NotifyType::SetProps => 3,
            NotifyType::SetLabel => 4,
            NotifyType::MutePost => 5,
            NotifyType::UnmutePost => 6,
            NotifyType::PinPost => 7,
            NotifyType::UnpinPost => 8,
            NotifyType::FlagPost => 9,
            NotifyType::Error => 10,
            NotifyType::Subscribe => 11,
            NotifyType::Reply => 12,
            NotifyType::ReplyComment => 13,
            NotifyType::Reblog => 14,
            NotifyType::Follow => 15,
            NotifyType::Mention => 16,
            NotifyType::Vote => 17,
        }
    }

    /// Reply type for a post at `depth`: direct replies to a root post are
    /// `Reply`, deeper ones `ReplyComment`.
    pub fn for_reply_depth(depth: i64) -> Self {
        if depth == 1 {
            NotifyType::Reply
        } else {
            NotifyType::ReplyComment
        }
    }
}

impl TryFrom<i64> for NotifyType {
    type Error = TypeError;

    fn try_from(value: i64) -> Result<Self, TypeError> {
        let kind = match value {
            1 => NotifyType::NewCommunity,
            2 => NotifyType::SetRole,
            3 => NotifyType::SetProps,
            4 => NotifyType::SetLabel,
            5 => NotifyType::MutePost,
            6 => NotifyType::UnmutePost,
            7 => NotifyType::PinPost,
            8 => NotifyType::UnpinPost,
            9 => NotifyType::FlagPost,
            10 => NotifyType::Error,
            11 => NotifyType::Subscribe,
            12 => NotifyType::Reply,
            13 => NotifyType::ReplyComment,
            14 => NotifyType::Reblog,
            15 => NotifyType::Follow,
            16 => NotifyType::Mention,
            17 => NotifyType::Vote,
            other => {
                return Err(TypeError::UnknownValue {
                    kind: "notification type",
                    value: other,
                })
            }
        };
        Ok(kind)
    }
}

/// Pack a notification id.
///
/// Rows of one type created within one block get near-consecutive ids, so
/// two sources only collide when more than 2^24 rows of the same type fall
/// into one block.
pub fn notification_id(block_num: BlockNum, type_id: u8, source_id: i64) -> i64 {
    (i64::from(block_num) << 32) | (i64::from(type_id) << TYPE_SHIFT) | (source_id & SOURCE_MASK)
}
