//! Client for the external media-processing provider.
//!
//! Covers the asset lifecycle the backend drives: direct upload slots
//! for new videos, asset lookup and deletion, playback/thumbnail URL
//! construction, and the webhook payloads the provider delivers as
//! assets move through processing.

pub mod client;
pub mod error;
pub mod types;
pub mod webhook;

pub use client::{MediaClient, MediaConfig};
pub use error::{MediaError, MediaResult};
pub use types::{Asset, DirectUpload, PlaybackId, ProviderAssetStatus};
pub use webhook::{
    MediaWebhookEvent, WebhookAssetData, EVENT_ASSET_CREATED, EVENT_ASSET_ERRORED,
    EVENT_ASSET_READY,
};
