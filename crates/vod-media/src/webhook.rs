//! Webhook payloads delivered by the media provider.

use serde::Deserialize;

use crate::types::{PlaybackId, ProviderAssetStatus};

/// Event names we act on. The provider sends more; unknown names are
/// acknowledged and dropped.
pub const EVENT_ASSET_CREATED: &str = "video.asset.created";
pub const EVENT_ASSET_READY: &str = "video.asset.ready";
pub const EVENT_ASSET_ERRORED: &str = "video.asset.errored";

/// A webhook delivery from the media provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookAssetData,
}

/// Asset fields carried by asset lifecycle events.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookAssetData {
    pub id: String,
    #[serde(default)]
    pub status: Option<ProviderAssetStatus>,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackId>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub passthrough: Option<String>,
    #[serde(default)]
    pub upload_id: Option<String>,
}

impl WebhookAssetData {
    /// First playback id, if the event carries one.
    pub fn playback_id(&self) -> Option<&str> {
        self.playback_ids.first().map(|p| p.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_ready_event_parses() {
        let body = serde_json::json!({
            "type": "video.asset.ready",
            "data": {
                "id": "asset-1",
                "status": "ready",
                "playback_ids": [{"id": "pb-1", "policy": "public"}],
                "duration": 93.5,
                "passthrough": "video-1"
            }
        });
        let event: MediaWebhookEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.event_type, EVENT_ASSET_READY);
        assert_eq!(event.data.playback_id(), Some("pb-1"));
        assert_eq!(event.data.passthrough.as_deref(), Some("video-1"));
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let body = serde_json::json!({
            "type": "video.asset.errored",
            "data": {
                "id": "asset-1",
                "errors": {"type": "invalid_input", "messages": ["bad codec"]}
            }
        });
        let event: MediaWebhookEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.event_type, EVENT_ASSET_ERRORED);
        assert!(event.data.playback_id().is_none());
    }
}
