//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Media provider error: {0}")]
    Media(#[from] vod_media::MediaError),

    #[error("Upload provider error: {0}")]
    Uploads(#[from] vod_uploads::UploadError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] vod_workflows::WorkflowError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Workflow(e) if e.is_duplicate() => StatusCode::CONFLICT,
            ApiError::Internal(_)
            | ApiError::Media(_)
            | ApiError::Uploads(_)
            | ApiError::Workflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<vod_store::StoreError> for ApiError {
    fn from(err: vod_store::StoreError) -> Self {
        use vod_store::StoreError;
        match err {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::InvalidRecord(msg) => ApiError::Internal(msg),
            StoreError::Json(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse { detail };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vod_store::StoreError;

    #[test]
    fn test_store_error_mapping() {
        let bad: ApiError = StoreError::validation("limit out of range").into();
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

        let missing: ApiError = StoreError::not_found("videos/x").into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let dup: ApiError = StoreError::conflict("videos/x").into();
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);

        let broken: ApiError = StoreError::invalid_record("bad field").into();
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_workflow_maps_to_conflict() {
        let err: ApiError =
            vod_workflows::WorkflowError::enqueue_failed("duplicate generation request: title:v1")
                .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
