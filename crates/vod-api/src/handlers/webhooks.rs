//! Provider webhook intake. Deliveries are verified against the shared
//! signing secret before the body is even parsed; after that, anything
//! we cannot act on is acknowledged so the provider stops retrying.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use tracing::{info, warn};
use vod_media::{
    MediaWebhookEvent, EVENT_ASSET_CREATED, EVENT_ASSET_ERRORED, EVENT_ASSET_READY,
};
use vod_models::VideoId;
use vod_store::StoreError;
use vod_uploads::verify_signature;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Header carrying the provider's `t=...,v1=...` signature.
pub const SIGNATURE_HEADER: &str = "media-signature";

/// `POST /webhooks/media` — asset lifecycle notifications.
pub async fn media_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing webhook signature"))?;

    verify_signature(
        &state.config.media_webhook_secret,
        signature,
        &body,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        warn!("Rejected media webhook: {}", e);
        ApiError::unauthorized("invalid webhook signature")
    })?;

    let event: MediaWebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("malformed webhook body: {e}")))?;
    metrics::record_webhook(&event.event_type);

    // The asset carries our video id as passthrough. Events without it
    // (assets created outside this app) are none of our business.
    let Some(passthrough) = event.data.passthrough.clone() else {
        info!(event = %event.event_type, asset_id = %event.data.id, "ignoring webhook without passthrough");
        return Ok(StatusCode::OK);
    };
    let video_id = VideoId::from_string(passthrough);

    let outcome = match event.event_type.as_str() {
        EVENT_ASSET_CREATED => {
            state
                .videos
                .set_asset_created(&video_id, &event.data.id)
                .await
        }
        EVENT_ASSET_READY => match event.data.playback_id() {
            Some(playback_id) => {
                let thumbnail_url = state.media.thumbnail_url(playback_id);
                let preview_url = state.media.preview_url(playback_id);
                state
                    .videos
                    .set_asset_ready(
                        &video_id,
                        playback_id,
                        event.data.duration,
                        &thumbnail_url,
                        &preview_url,
                    )
                    .await
            }
            None => {
                warn!(video_id = %video_id, "asset ready event without playback id");
                return Ok(StatusCode::OK);
            }
        },
        EVENT_ASSET_ERRORED => state.videos.set_asset_errored(&video_id).await,
        other => {
            info!(event = %other, "ignoring unhandled webhook event");
            return Ok(StatusCode::OK);
        }
    };

    match outcome {
        Ok(()) => {
            info!(event = %event.event_type, video_id = %video_id, "applied media webhook");
            Ok(StatusCode::OK)
        }
        // The video was deleted while the asset was processing. Ack so
        // the provider does not retry forever.
        Err(StoreError::NotFound(_)) => {
            warn!(video_id = %video_id, "webhook for unknown video, acknowledging");
            Ok(StatusCode::OK)
        }
        Err(e) => Err(e.into()),
    }
}
