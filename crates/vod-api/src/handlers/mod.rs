//! HTTP handlers.

pub mod categories;
pub mod health;
pub mod history;
pub mod playlists;
pub mod subscriptions;
pub mod videos;
pub mod webhooks;
