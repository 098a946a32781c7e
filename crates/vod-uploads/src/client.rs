//! HTTP client for the file-upload provider.
//!
//! Hosts static images (custom and regenerated thumbnails). The
//! provider issues short-lived presigned PUT URLs; the stored file is
//! addressed by an opaque key and served from a public CDN URL.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{UploadError, UploadResult};

const DEFAULT_API_BASE: &str = "https://api.uploads.example/v1/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upload provider configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct UploadsConfig {
    /// REST API base URL
    pub api_base: Url,
    /// API key sent as a bearer token
    pub api_key: String,
}

impl UploadsConfig {
    /// Load from environment variables. `UPLOADS_API_KEY` is required.
    pub fn from_env() -> UploadResult<Self> {
        let api_key = std::env::var("UPLOADS_API_KEY")
            .map_err(|_| UploadError::config("UPLOADS_API_KEY must be set"))?;
        let api_base =
            std::env::var("UPLOADS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let api_base = Url::parse(&api_base)
            .map_err(|e| UploadError::config(format!("invalid UPLOADS_API_BASE: {e}")))?;
        Ok(Self { api_base, api_key })
    }
}

/// A presigned upload slot issued by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PresignedUpload {
    /// Opaque file key, used later for deletion
    pub key: String,
    /// Short-lived PUT target for the raw bytes
    pub upload_url: String,
    /// Public CDN URL the file will be served from
    pub file_url: String,
}

#[derive(Debug, Serialize)]
struct CreateUploadRequest<'a> {
    file_name: &'a str,
    content_type: &'a str,
}

/// Client for the provider's file endpoints.
#[derive(Clone)]
pub struct UploadsClient {
    http: reqwest::Client,
    config: UploadsConfig,
}

impl UploadsClient {
    pub fn new(config: UploadsConfig) -> UploadResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> UploadResult<Url> {
        self.config
            .api_base
            .join(path)
            .map_err(|e| UploadError::config(format!("invalid endpoint path '{path}': {e}")))
    }

    /// Request a presigned upload slot for a new file.
    pub async fn create_upload(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> UploadResult<PresignedUpload> {
        let response = self
            .http
            .post(self.endpoint("files")?)
            .bearer_auth(&self.config.api_key)
            .json(&CreateUploadRequest {
                file_name,
                content_type,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let upload: PresignedUpload = response.json().await?;
        debug!(key = %upload.key, file_name, "created presigned upload");
        Ok(upload)
    }

    /// Delete a stored file by key. Missing files are treated as
    /// deleted so cleanup stays idempotent.
    pub async fn delete_file(&self, key: &str) -> UploadResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("files/{key}"))?)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(key, "file already gone at provider");
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn api_error(response: reqwest::Response) -> UploadError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "no detail".to_string());
        UploadError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> UploadsConfig {
        UploadsConfig {
            api_base: Url::parse(&format!("{base}/v1/")).unwrap(),
            api_key: "test-key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "key": "file-1",
                "upload_url": "https://put.uploads.example/file-1",
                "file_url": "https://cdn.uploads.example/file-1"
            })))
            .mount(&server)
            .await;

        let client = UploadsClient::new(test_config(&server.uri())).unwrap();
        let upload = client.create_upload("thumb.jpg", "image/jpeg").await.unwrap();
        assert_eq!(upload.key, "file-1");
        assert!(upload.file_url.starts_with("https://cdn."));
    }

    #[tokio::test]
    async fn test_delete_file_tolerates_missing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/files/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = UploadsClient::new(test_config(&server.uri())).unwrap();
        client.delete_file("gone").await.unwrap();
    }

    #[tokio::test]
    async fn test_api_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = UploadsClient::new(test_config(&server.uri())).unwrap();
        let err = client.create_upload("x.png", "image/png").await.unwrap_err();
        match err {
            UploadError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
