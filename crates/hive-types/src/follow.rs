//! Follow relationship state.

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// State of a follower → following edge, stored as a small integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowState {
    #[default]
    None,
    Follow,
    Mute,
}

impl FollowState {
    pub fn as_i64(self) -> i64 {
        match self {
            FollowState::None => 0,
            FollowState::Follow => 1,
            FollowState::Mute => 2,
        }
    }
}

impl TryFrom<i64> for FollowState {
    type Error = TypeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FollowState::None),
            1 => Ok(FollowState::Follow),
            2 => Ok(FollowState::Mute),
            other => Err(TypeError::UnknownValue {
                kind: "follow state",
                value: other,
            }),
        }
    }
}
