//! Upload provider error types.

use thiserror::Error;

/// Result type for upload provider operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors returned by the file-upload provider client.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload configuration error: {0}")]
    Config(String),

    #[error("Upload API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook signature rejected: {0}")]
    Signature(String),
}

impl UploadError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn signature(msg: impl Into<String>) -> Self {
        Self::Signature(msg.into())
    }
}
