//! Wire types for the media-processing provider API.

use serde::{Deserialize, Serialize};

/// Processing state reported by the provider for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderAssetStatus {
    Preparing,
    Ready,
    Errored,
}

/// A playback handle attached to an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackId {
    pub id: String,
    pub policy: String,
}

/// A provider asset as returned by the asset endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub id: String,
    pub status: ProviderAssetStatus,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackId>,
    #[serde(default)]
    pub duration: Option<f64>,
    /// Opaque caller data echoed back; carries our video id
    #[serde(default)]
    pub passthrough: Option<String>,
}

impl Asset {
    /// First public playback id, if the asset has one.
    pub fn playback_id(&self) -> Option<&str> {
        self.playback_ids.first().map(|p| p.id.as_str())
    }
}

/// A direct upload slot: the client PUTs the raw file to `url` and the
/// provider creates the asset from it.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectUpload {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub asset_id: Option<String>,
}

/// Request body for creating a direct upload.
#[derive(Debug, Serialize)]
pub(crate) struct CreateUploadRequest {
    pub cors_origin: String,
    pub new_asset_settings: NewAssetSettings,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewAssetSettings {
    pub playback_policy: Vec<String>,
    pub passthrough: String,
}

/// Generic provider envelope: every response nests payload under `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Error body the provider returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub messages: Vec<String>,
}
