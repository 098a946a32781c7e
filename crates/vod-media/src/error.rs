//! Media provider error types.

use thiserror::Error;

/// Result type for media provider operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors returned by the media-processing provider client.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media configuration error: {0}")]
    Config(String),

    #[error("Media API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Media request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected media response: {0}")]
    InvalidResponse(String),
}

impl MediaError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether the provider no longer knows the referenced resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}
