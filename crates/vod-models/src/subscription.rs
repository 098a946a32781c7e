//! Channel subscription models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::UserId;

/// A viewer's subscription to a creator. Unique per (viewer, creator).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Subscription {
    /// Unique subscription ID
    pub id: String,

    /// Subscribing user
    pub viewer_id: UserId,

    /// Subscribed-to creator
    pub creator_id: UserId,

    /// When the subscription was created
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new subscription record.
    pub fn new(viewer_id: UserId, creator_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            viewer_id,
            creator_id,
            created_at: Utc::now(),
        }
    }
}
