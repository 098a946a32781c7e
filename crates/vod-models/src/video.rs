//! Video metadata models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{CategoryId, UserId, VideoId};

/// Video visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoVisibility {
    /// Visible in public feeds
    Public,
    /// Visible only to the owner
    #[default]
    Private,
}

impl VideoVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoVisibility::Public => "public",
            VideoVisibility::Private => "private",
        }
    }
}

impl fmt::Display for VideoVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoVisibility {
    type Err = VisibilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err(VisibilityParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown visibility: {0}")]
pub struct VisibilityParseError(String);

/// Processing state of the upstream media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Upload URL issued, no bytes received yet
    #[default]
    Waiting,
    /// Provider is transcoding the upload
    Preparing,
    /// Playable
    Ready,
    /// Provider reported a processing failure
    Errored,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Waiting => "waiting",
            AssetStatus::Preparing => "preparing",
            AssetStatus::Ready => "ready",
            AssetStatus::Errored => "errored",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = AssetStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "errored" => Ok(Self::Errored),
            _ => Err(AssetStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown asset status: {0}")]
pub struct AssetStatusParseError(String);

/// A hosted video record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    /// Unique video ID
    pub id: VideoId,

    /// User ID (owner)
    pub owner_id: UserId,

    /// Video title
    pub title: String,

    /// Video description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category, if assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    /// Visibility
    #[serde(default)]
    pub visibility: VideoVisibility,

    /// Asset id at the media-processing provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,

    /// Processing status of the asset
    #[serde(default)]
    pub asset_status: AssetStatus,

    /// Playback id at the media-processing provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,

    /// Thumbnail URL (provider-generated or AI-regenerated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Animated preview URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,

    /// Duration in seconds, known once the asset is ready
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,

    /// Total registered views
    #[serde(default)]
    pub view_count: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Create a new draft video owned by `owner_id`.
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: VideoId::new(),
            owner_id,
            title: title.into(),
            description: None,
            category_id: None,
            visibility: VideoVisibility::Private,
            asset_id: None,
            asset_status: AssetStatus::Waiting,
            playback_id: None,
            thumbnail_url: None,
            preview_url: None,
            duration_secs: None,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this video may appear in public feeds.
    pub fn is_public(&self) -> bool {
        self.visibility == VideoVisibility::Public
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_video_defaults() {
        let video = Video::new(UserId::from_string("user-1"), "First upload");
        assert_eq!(video.visibility, VideoVisibility::Private);
        assert_eq!(video.asset_status, AssetStatus::Waiting);
        assert_eq!(video.view_count, 0);
        assert!(!video.is_public());
    }

    #[test]
    fn test_enum_wire_shape_is_snake_case() {
        assert_eq!(
            serde_json::to_value(VideoVisibility::Public).unwrap(),
            serde_json::json!("public")
        );
        assert_eq!(
            serde_json::to_value(AssetStatus::Errored).unwrap(),
            serde_json::json!("errored")
        );
        let status: AssetStatus = serde_json::from_value(serde_json::json!("preparing")).unwrap();
        assert_eq!(status, AssetStatus::Preparing);
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("public".parse::<VideoVisibility>().unwrap(), VideoVisibility::Public);
        assert_eq!("private".parse::<VideoVisibility>().unwrap(), VideoVisibility::Private);
        assert!("unlisted".parse::<VideoVisibility>().is_err());
    }

    #[test]
    fn test_asset_status_round_trip() {
        for status in [
            AssetStatus::Waiting,
            AssetStatus::Preparing,
            AssetStatus::Ready,
            AssetStatus::Errored,
        ] {
            assert_eq!(status.as_str().parse::<AssetStatus>().unwrap(), status);
        }
    }
}
