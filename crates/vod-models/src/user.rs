//! User profile models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A platform user, mirrored from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Durable user ID from the identity provider
    pub id: UserId,

    /// URL-safe handle
    pub handle: String,

    /// Display name
    pub display_name: String,

    /// Avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record.
    pub fn new(id: UserId, handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            display_name: display_name.into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }
}
