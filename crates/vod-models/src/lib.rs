//! Shared data models for the VOD Hub backend.
//!
//! This crate provides Serde-serializable types for:
//! - Videos, categories and upload asset lifecycle
//! - Playlists and playlist membership
//! - Reactions, subscriptions and watch history
//! - Users

pub mod category;
pub mod ids;
pub mod playlist;
pub mod reaction;
pub mod subscription;
pub mod user;
pub mod video;
pub mod view;

// Re-export common types
pub use category::Category;
pub use ids::{CategoryId, PlaylistId, UserId, VideoId};
pub use playlist::{Playlist, PlaylistItem};
pub use reaction::{Reaction, ReactionKind};
pub use subscription::Subscription;
pub use user::User;
pub use video::{AssetStatus, Video, VideoVisibility};
pub use view::ViewEvent;
