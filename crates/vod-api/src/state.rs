//! Application state.

use std::sync::Arc;

use vod_media::{MediaClient, MediaConfig};
use vod_store::repos::{
    CategoryRepository, PlaylistItemRepository, PlaylistRepository, ReactionRepository,
    SubscriptionRepository, UserRepository, VideoRepository, ViewRepository,
};
use vod_store::MemoryStore;
use vod_uploads::{UploadsClient, UploadsConfig};
use vod_workflows::WorkflowTrigger;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub videos: VideoRepository,
    pub playlists: PlaylistRepository,
    pub playlist_items: PlaylistItemRepository,
    pub categories: CategoryRepository,
    pub reactions: ReactionRepository,
    pub subscriptions: SubscriptionRepository,
    pub views: ViewRepository,
    pub users: UserRepository,
    pub media: Arc<MediaClient>,
    pub uploads: Arc<UploadsClient>,
    pub workflows: Arc<WorkflowTrigger>,
}

impl AppState {
    /// Create new application state. Seeds the default categories on
    /// first boot.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());

        let media = MediaClient::new(MediaConfig::from_env()?)?;
        let uploads = UploadsClient::new(UploadsConfig::from_env()?)?;
        let workflows = WorkflowTrigger::from_env()?;
        workflows.init().await?;

        let state = Self::with_parts(config, store, media, uploads, workflows);
        state.categories.seed_defaults().await?;
        Ok(state)
    }

    /// Assemble state from already-built collaborators (tests inject
    /// mock-backed clients here).
    pub fn with_parts(
        config: ApiConfig,
        store: Arc<MemoryStore>,
        media: MediaClient,
        uploads: UploadsClient,
        workflows: WorkflowTrigger,
    ) -> Self {
        Self {
            config,
            videos: VideoRepository::new(store.clone()),
            playlists: PlaylistRepository::new(store.clone()),
            playlist_items: PlaylistItemRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            reactions: ReactionRepository::new(store.clone()),
            subscriptions: SubscriptionRepository::new(store.clone()),
            views: ViewRepository::new(store.clone()),
            users: UserRepository::new(store),
            media: Arc::new(media),
            uploads: Arc::new(uploads),
            workflows: Arc::new(workflows),
        }
    }
}
