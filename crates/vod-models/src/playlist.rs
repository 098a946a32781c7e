//! Playlist models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{PlaylistId, UserId, VideoId};

/// A user-owned playlist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Playlist {
    /// Unique playlist ID
    pub id: PlaylistId,

    /// User ID (owner)
    pub owner_id: UserId,

    /// Playlist name
    pub name: String,

    /// Playlist description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp (bumped when membership changes)
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new empty playlist.
    pub fn new(owner_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PlaylistId::new(),
            owner_id,
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Membership of a video in a playlist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistItem {
    /// Unique membership ID
    pub id: String,

    /// Owning playlist
    pub playlist_id: PlaylistId,

    /// Member video
    pub video_id: VideoId,

    /// When the video was added
    pub added_at: DateTime<Utc>,
}

impl PlaylistItem {
    /// Create a new membership record.
    pub fn new(playlist_id: PlaylistId, video_id: VideoId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            playlist_id,
            video_id,
            added_at: Utc::now(),
        }
    }
}
