//! Playlist and playlist-membership repositories.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use vod_models::{Playlist, PlaylistId, PlaylistItem, UserId, VideoId};

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::memory::{CountAggregate, MemoryStore};
use crate::paginate::{fetch_page, fetch_page_with, Cursor, Order, Page};
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "playlists";
const ITEMS_COLLECTION: &str = "playlist_items";

/// Derived field carrying the membership count on playlist listings.
const VIDEO_COUNT_FIELD: &str = "video_count";

fn playlist_to_fields(playlist: &Playlist) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("owner_id".to_string(), playlist.owner_id.as_str().to_store_value());
    fields.insert("name".to_string(), playlist.name.to_store_value());
    fields.insert("description".to_string(), playlist.description.to_store_value());
    fields.insert("created_at".to_string(), playlist.created_at.to_store_value());
    fields.insert("updated_at".to_string(), playlist.updated_at.to_store_value());
    fields
}

fn record_to_playlist(record: &Record) -> StoreResult<Playlist> {
    Ok(Playlist {
        id: PlaylistId::from_string(record.id.clone()),
        owner_id: UserId::from_string(record.require::<String>("owner_id")?),
        name: record.require("name")?,
        description: record.get_opt("description"),
        created_at: record.require("created_at")?,
        updated_at: record.require("updated_at")?,
    })
}

fn item_to_fields(item: &PlaylistItem) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("playlist_id".to_string(), item.playlist_id.as_str().to_store_value());
    fields.insert("video_id".to_string(), item.video_id.as_str().to_store_value());
    fields.insert("added_at".to_string(), item.added_at.to_store_value());
    fields
}

fn record_to_item(record: &Record) -> StoreResult<PlaylistItem> {
    Ok(PlaylistItem {
        id: record.id.clone(),
        playlist_id: PlaylistId::from_string(record.require::<String>("playlist_id")?),
        video_id: VideoId::from_string(record.require::<String>("video_id")?),
        added_at: record.require("added_at")?,
    })
}

/// Repository for playlists.
#[derive(Clone)]
pub struct PlaylistRepository {
    store: Arc<MemoryStore>,
}

impl PlaylistRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, playlist: &Playlist) -> StoreResult<()> {
        let record = Record::new(playlist.id.as_str(), playlist_to_fields(playlist));
        self.store.insert(COLLECTION, record).await
    }

    pub async fn get(&self, id: &PlaylistId) -> StoreResult<Option<Playlist>> {
        match self.store.get(COLLECTION, id.as_str()).await {
            Some(record) => Ok(Some(record_to_playlist(&record)?)),
            None => Ok(None),
        }
    }

    /// Rename or re-describe a playlist.
    pub async fn update_details(
        &self,
        id: &PlaylistId,
        name: Option<String>,
        description: Option<String>,
    ) -> StoreResult<()> {
        let mut fields = HashMap::new();
        if let Some(name) = name {
            fields.insert("name".to_string(), name.to_store_value());
        }
        if let Some(description) = description {
            fields.insert("description".to_string(), description.to_store_value());
        }
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Bump `updated_at`, called whenever membership changes so the
    /// owner's listing surfaces recently touched playlists first.
    pub async fn touch(&self, id: &PlaylistId) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    pub async fn delete(&self, id: &PlaylistId) -> bool {
        self.store.delete(COLLECTION, id.as_str()).await
    }

    /// The owner's playlists, most recently updated first, each row
    /// carrying its membership count.
    pub async fn list_owned(
        &self,
        owner_id: &UserId,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<(Playlist, i64)>> {
        let filter = Filter::new().eq("owner_id", owner_id.as_str());
        let aggregate = CountAggregate {
            as_field: VIDEO_COUNT_FIELD.to_string(),
            collection: ITEMS_COLLECTION.to_string(),
            fk_field: "playlist_id".to_string(),
            extra: Filter::new(),
        };
        let page = fetch_page_with(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("updated_at"),
            cursor,
            limit,
            vec![aggregate],
        )
        .await?;

        let items = page
            .items
            .iter()
            .map(|record| {
                let playlist = record_to_playlist(record)?;
                let count: i64 = record.get_opt(VIDEO_COUNT_FIELD).unwrap_or(0);
                Ok((playlist, count))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Page {
            items,
            next_cursor: page.next_cursor,
        })
    }
}

/// Repository for playlist membership.
#[derive(Clone)]
pub struct PlaylistItemRepository {
    store: Arc<MemoryStore>,
}

impl PlaylistItemRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Add a video to a playlist. Fails with `Conflict` when the video
    /// is already a member.
    pub async fn add(&self, item: &PlaylistItem) -> StoreResult<()> {
        let existing = Filter::new()
            .eq("playlist_id", item.playlist_id.as_str())
            .eq("video_id", item.video_id.as_str());
        if self.store.exists_where(ITEMS_COLLECTION, &existing).await {
            return Err(StoreError::conflict(format!(
                "video {} already in playlist {}",
                item.video_id, item.playlist_id
            )));
        }
        let record = Record::new(item.id.as_str(), item_to_fields(item));
        self.store.insert(ITEMS_COLLECTION, record).await
    }

    /// Remove a video from a playlist. Returns whether it was a member.
    pub async fn remove(&self, playlist_id: &PlaylistId, video_id: &VideoId) -> StoreResult<bool> {
        let filter = Filter::new()
            .eq("playlist_id", playlist_id.as_str())
            .eq("video_id", video_id.as_str());
        Ok(self.store.delete_where(ITEMS_COLLECTION, &filter).await > 0)
    }

    /// Whether the video is a member of the playlist.
    pub async fn contains(&self, playlist_id: &PlaylistId, video_id: &VideoId) -> bool {
        let filter = Filter::new()
            .eq("playlist_id", playlist_id.as_str())
            .eq("video_id", video_id.as_str());
        self.store.exists_where(ITEMS_COLLECTION, &filter).await
    }

    /// One page of a playlist's members, most recently added first.
    pub async fn list_page(
        &self,
        playlist_id: &PlaylistId,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<PlaylistItem>> {
        let filter = Filter::new().eq("playlist_id", playlist_id.as_str());
        let page = fetch_page(
            &self.store,
            ITEMS_COLLECTION,
            filter,
            Order::desc("added_at"),
            cursor,
            limit,
        )
        .await?;
        let items = page
            .items
            .iter()
            .map(record_to_item)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Page {
            items,
            next_cursor: page.next_cursor,
        })
    }

    /// Drop every membership row of a deleted playlist.
    pub async fn delete_for_playlist(&self, playlist_id: &PlaylistId) -> u64 {
        let filter = Filter::new().eq("playlist_id", playlist_id.as_str());
        self.store.delete_where(ITEMS_COLLECTION, &filter).await
    }

    /// Drop every membership row referencing a deleted video.
    pub async fn delete_for_video(&self, video_id: &VideoId) -> u64 {
        let filter = Filter::new().eq("video_id", video_id.as_str());
        self.store.delete_where(ITEMS_COLLECTION, &filter).await
    }
}
