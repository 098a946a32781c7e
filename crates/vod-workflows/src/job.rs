//! Background generation job payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vod_models::{UserId, VideoId};

/// What the background workflow should generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    Title,
    Description,
    Thumbnail,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Title => "title",
            GenerationKind::Description => "description",
            GenerationKind::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request for AI generation of video metadata, consumed by the
/// workflow worker out of band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    /// Unique job ID
    pub id: String,

    /// What to generate
    pub kind: GenerationKind,

    /// Target video
    pub video_id: VideoId,

    /// Requesting owner, for result attribution and notification
    pub owner_id: UserId,

    /// When the job was requested
    pub requested_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Create a new generation job.
    pub fn new(kind: GenerationKind, video_id: VideoId, owner_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            video_id,
            owner_id,
            requested_at: Utc::now(),
        }
    }

    /// Deterministic key suppressing duplicate requests for the same
    /// generation while one is already in flight.
    pub fn idempotency_key(&self) -> String {
        format!("{}:{}", self.kind, self.video_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_ignores_job_identity() {
        let video = VideoId::from_string("video-1");
        let owner = UserId::from_string("user-1");
        let a = GenerationJob::new(GenerationKind::Title, video.clone(), owner.clone());
        let b = GenerationJob::new(GenerationKind::Title, video.clone(), owner.clone());
        assert_ne!(a.id, b.id);
        assert_eq!(a.idempotency_key(), b.idempotency_key());

        let c = GenerationJob::new(GenerationKind::Thumbnail, video, owner);
        assert_ne!(a.idempotency_key(), c.idempotency_key());
    }

    #[test]
    fn test_job_round_trips_through_json() {
        let job = GenerationJob::new(
            GenerationKind::Description,
            VideoId::from_string("video-1"),
            UserId::from_string("user-1"),
        );
        let json = serde_json::to_string(&job).unwrap();
        let restored: GenerationJob = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, job.id);
        assert_eq!(restored.kind, GenerationKind::Description);
    }
}
