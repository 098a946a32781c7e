//! Video reaction models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ids::{UserId, VideoId};

/// Reaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = ReactionKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            _ => Err(ReactionKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown reaction kind: {0}")]
pub struct ReactionKindParseError(String);

/// A user's reaction to a video. Unique per (user, video).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Reaction {
    /// Unique reaction ID
    pub id: String,

    /// Reacting user
    pub user_id: UserId,

    /// Target video
    pub video_id: VideoId,

    /// Like or dislike
    pub kind: ReactionKind,

    /// When the reaction was (last) set
    pub reacted_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new reaction record.
    pub fn new(user_id: UserId, video_id: VideoId, kind: ReactionKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            video_id,
            kind,
            reacted_at: Utc::now(),
        }
    }
}
