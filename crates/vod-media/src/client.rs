//! HTTP client for the media-processing provider.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::error::{MediaError, MediaResult};
use crate::types::{
    ApiErrorBody, Asset, CreateUploadRequest, DataEnvelope, DirectUpload, NewAssetSettings,
};

const DEFAULT_API_BASE: &str = "https://api.media.example/video/v1/";
const DEFAULT_STREAM_BASE: &str = "https://stream.media.example";
const DEFAULT_IMAGE_BASE: &str = "https://image.media.example";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Media provider configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// REST API base URL
    pub api_base: Url,
    /// Access token id (basic auth username)
    pub token_id: String,
    /// Access token secret (basic auth password)
    pub token_secret: String,
    /// Origin allowed to PUT to direct upload URLs
    pub cors_origin: String,
    /// Base URL for HLS playback
    pub stream_base: String,
    /// Base URL for thumbnails and animated previews
    pub image_base: String,
}

impl MediaConfig {
    /// Load from environment variables. `MEDIA_TOKEN_ID` and
    /// `MEDIA_TOKEN_SECRET` are required; everything else has a default.
    pub fn from_env() -> MediaResult<Self> {
        let token_id = std::env::var("MEDIA_TOKEN_ID")
            .map_err(|_| MediaError::config("MEDIA_TOKEN_ID must be set"))?;
        let token_secret = std::env::var("MEDIA_TOKEN_SECRET")
            .map_err(|_| MediaError::config("MEDIA_TOKEN_SECRET must be set"))?;
        let api_base = std::env::var("MEDIA_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let api_base = Url::parse(&api_base)
            .map_err(|e| MediaError::config(format!("invalid MEDIA_API_BASE: {e}")))?;
        let cors_origin = std::env::var("MEDIA_CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());
        let stream_base = std::env::var("MEDIA_STREAM_BASE")
            .unwrap_or_else(|_| DEFAULT_STREAM_BASE.to_string());
        let image_base = std::env::var("MEDIA_IMAGE_BASE")
            .unwrap_or_else(|_| DEFAULT_IMAGE_BASE.to_string());
        Ok(Self {
            api_base,
            token_id,
            token_secret,
            cors_origin,
            stream_base,
            image_base,
        })
    }
}

/// Client for the provider's asset and upload endpoints.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    config: MediaConfig,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> MediaResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> MediaResult<Url> {
        self.config
            .api_base
            .join(path)
            .map_err(|e| MediaError::config(format!("invalid endpoint path '{path}': {e}")))
    }

    /// Create a direct upload slot for a new video. `video_id` rides
    /// along as passthrough so webhook events can be matched back.
    pub async fn create_direct_upload(&self, video_id: &str) -> MediaResult<DirectUpload> {
        let body = CreateUploadRequest {
            cors_origin: self.config.cors_origin.clone(),
            new_asset_settings: NewAssetSettings {
                playback_policy: vec!["public".to_string()],
                passthrough: video_id.to_string(),
            },
        };
        let response = self
            .http
            .post(self.endpoint("uploads")?)
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
            .json(&body)
            .send()
            .await?;
        let upload: DataEnvelope<DirectUpload> = Self::read_json(response).await?;
        debug!(upload_id = %upload.data.id, video_id, "created direct upload");
        Ok(upload.data)
    }

    /// Fetch an asset's current state.
    pub async fn get_asset(&self, asset_id: &str) -> MediaResult<Asset> {
        let response = self
            .http
            .get(self.endpoint(&format!("assets/{asset_id}"))?)
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
            .send()
            .await?;
        let asset: DataEnvelope<Asset> = Self::read_json(response).await?;
        Ok(asset.data)
    }

    /// Delete an asset. Treats provider-side 404 as success so that
    /// video deletion stays idempotent.
    pub async fn delete_asset(&self, asset_id: &str) -> MediaResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("assets/{asset_id}"))?)
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(asset_id, "asset already gone at provider");
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    /// HLS playback URL for a playback id.
    pub fn playback_url(&self, playback_id: &str) -> String {
        format!("{}/{playback_id}.m3u8", self.config.stream_base)
    }

    /// Still thumbnail URL for a playback id.
    pub fn thumbnail_url(&self, playback_id: &str) -> String {
        format!("{}/{playback_id}/thumbnail.jpg", self.config.image_base)
    }

    /// Animated hover-preview URL for a playback id.
    pub fn preview_url(&self, playback_id: &str) -> String {
        format!("{}/{playback_id}/animated.gif", self.config.image_base)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> MediaResult<T> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| MediaError::invalid_response(format!("malformed body: {e}")))
    }

    async fn api_error(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body
                .error
                .map(|e| e.messages.join("; "))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "no detail".to_string()),
            Err(_) => "no detail".to_string(),
        };
        MediaError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> MediaConfig {
        MediaConfig {
            api_base: Url::parse(&format!("{base}/video/v1/")).unwrap(),
            token_id: "token-id".to_string(),
            token_secret: "token-secret".to_string(),
            cors_origin: "https://vodhub.example".to_string(),
            stream_base: DEFAULT_STREAM_BASE.to_string(),
            image_base: DEFAULT_IMAGE_BASE.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_direct_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video/v1/uploads"))
            .and(basic_auth("token-id", "token-secret"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": {"id": "upload-1", "url": "https://storage.media.example/upload-1"}
            })))
            .mount(&server)
            .await;

        let client = MediaClient::new(test_config(&server.uri())).unwrap();
        let upload = client.create_direct_upload("video-1").await.unwrap();
        assert_eq!(upload.id, "upload-1");
        assert!(upload.asset_id.is_none());
    }

    #[tokio::test]
    async fn test_get_asset_parses_playback_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video/v1/assets/asset-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "id": "asset-1",
                    "status": "ready",
                    "playback_ids": [{"id": "pb-1", "policy": "public"}],
                    "duration": 12.0,
                    "passthrough": "video-1"
                }
            })))
            .mount(&server)
            .await;

        let client = MediaClient::new(test_config(&server.uri())).unwrap();
        let asset = client.get_asset("asset-1").await.unwrap();
        assert_eq!(asset.playback_id(), Some("pb-1"));
        assert_eq!(asset.passthrough.as_deref(), Some("video-1"));
    }

    #[tokio::test]
    async fn test_delete_asset_tolerates_missing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/video/v1/assets/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = MediaClient::new(test_config(&server.uri())).unwrap();
        client.delete_asset("gone").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_carries_provider_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/video/v1/assets/bad"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "error": {"messages": ["invalid asset id"]}
            })))
            .mount(&server)
            .await;

        let client = MediaClient::new(test_config(&server.uri())).unwrap();
        let err = client.get_asset("bad").await.unwrap_err();
        match err {
            MediaError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid asset id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_url_builders() {
        let client = MediaClient::new(test_config("https://api.media.example")).unwrap();
        assert_eq!(
            client.playback_url("pb-1"),
            "https://stream.media.example/pb-1.m3u8"
        );
        assert_eq!(
            client.thumbnail_url("pb-1"),
            "https://image.media.example/pb-1/thumbnail.jpg"
        );
        assert_eq!(
            client.preview_url("pb-1"),
            "https://image.media.example/pb-1/animated.gif"
        );
    }
}
