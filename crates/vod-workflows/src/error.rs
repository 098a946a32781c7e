//! Workflow trigger error types.

use thiserror::Error;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur when triggering background workflows.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Job serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Enqueue failed: {0}")]
    EnqueueFailed(String),
}

impl WorkflowError {
    pub fn enqueue_failed(msg: impl Into<String>) -> Self {
        Self::EnqueueFailed(msg.into())
    }

    /// Whether the failure is a duplicate-suppression rejection rather
    /// than an infrastructure problem.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::EnqueueFailed(msg) if msg.contains("duplicate"))
    }
}
