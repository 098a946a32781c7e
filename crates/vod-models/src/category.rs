//! Video category models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::CategoryId;

/// A fixed browsing category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    /// Unique category ID
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

/// Default category names seeded on first boot.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Cars and vehicles",
    "Comedy",
    "Education",
    "Gaming",
    "Entertainment",
    "Film and animation",
    "How-to and style",
    "Music",
    "News and politics",
    "People and blogs",
    "Pets and animals",
    "Science and technology",
    "Sports",
    "Travel and events",
];
