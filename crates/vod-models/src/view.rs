//! Watch history models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{UserId, VideoId};

/// A user's view of a video. One record per (user, video); re-watching
/// refreshes `viewed_at` so history stays ordered by recency.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewEvent {
    /// Unique view record ID
    pub id: String,

    /// Viewing user
    pub user_id: UserId,

    /// Watched video
    pub video_id: VideoId,

    /// When the video was last watched
    pub viewed_at: DateTime<Utc>,
}

impl ViewEvent {
    /// Create a new view record.
    pub fn new(user_id: UserId, video_id: VideoId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            video_id,
            viewed_at: Utc::now(),
        }
    }
}
