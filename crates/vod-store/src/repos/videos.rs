//! Video repository.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use vod_models::{AssetStatus, CategoryId, UserId, Video, VideoId, VideoVisibility};

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::paginate::{fetch_page, validate_limit, Cursor, Order, Page};
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "videos";

/// Convert a video to stored fields.
fn video_to_fields(video: &Video) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("owner_id".to_string(), video.owner_id.as_str().to_store_value());
    fields.insert("title".to_string(), video.title.to_store_value());
    fields.insert("description".to_string(), video.description.to_store_value());
    fields.insert(
        "category_id".to_string(),
        video
            .category_id
            .as_ref()
            .map(|c| c.as_str().to_string())
            .to_store_value(),
    );
    fields.insert("visibility".to_string(), video.visibility.as_str().to_store_value());
    fields.insert("asset_id".to_string(), video.asset_id.to_store_value());
    fields.insert(
        "asset_status".to_string(),
        video.asset_status.as_str().to_store_value(),
    );
    fields.insert("playback_id".to_string(), video.playback_id.to_store_value());
    fields.insert("thumbnail_url".to_string(), video.thumbnail_url.to_store_value());
    fields.insert("preview_url".to_string(), video.preview_url.to_store_value());
    fields.insert("duration_secs".to_string(), video.duration_secs.to_store_value());
    fields.insert("view_count".to_string(), video.view_count.to_store_value());
    fields.insert("created_at".to_string(), video.created_at.to_store_value());
    fields.insert("updated_at".to_string(), video.updated_at.to_store_value());
    fields
}

/// Convert a stored record to a video.
fn record_to_video(record: &Record) -> StoreResult<Video> {
    let visibility = record
        .require::<String>("visibility")?
        .parse::<VideoVisibility>()
        .map_err(|e| StoreError::invalid_record(e.to_string()))?;
    let asset_status = record
        .require::<String>("asset_status")?
        .parse::<AssetStatus>()
        .map_err(|e| StoreError::invalid_record(e.to_string()))?;

    Ok(Video {
        id: VideoId::from_string(record.id.clone()),
        owner_id: UserId::from_string(record.require::<String>("owner_id")?),
        title: record.require("title")?,
        description: record.get_opt("description"),
        category_id: record.get_opt::<String>("category_id").map(CategoryId::from_string),
        visibility,
        asset_id: record.get_opt("asset_id"),
        asset_status,
        playback_id: record.get_opt("playback_id"),
        thumbnail_url: record.get_opt("thumbnail_url"),
        preview_url: record.get_opt("preview_url"),
        duration_secs: record.get_opt("duration_secs"),
        view_count: record.get_opt("view_count").unwrap_or(0),
        created_at: record.require("created_at")?,
        updated_at: record.require("updated_at")?,
    })
}

fn page_to_videos(page: Page<Record>) -> StoreResult<Page<Video>> {
    let items = page
        .items
        .iter()
        .map(record_to_video)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(Page {
        items,
        next_cursor: page.next_cursor,
    })
}

/// Repository for video metadata.
#[derive(Clone)]
pub struct VideoRepository {
    store: Arc<MemoryStore>,
}

impl VideoRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Create a new video record.
    pub async fn create(&self, video: &Video) -> StoreResult<()> {
        let record = Record::new(video.id.as_str(), video_to_fields(video));
        self.store.insert(COLLECTION, record).await?;
        debug!(video_id = %video.id, "created video");
        Ok(())
    }

    /// Get a video by id.
    pub async fn get(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        match self.store.get(COLLECTION, id.as_str()).await {
            Some(record) => Ok(Some(record_to_video(&record)?)),
            None => Ok(None),
        }
    }

    /// Get several videos by id, preserving input order and skipping
    /// ids that no longer resolve (deleted since the referencing row
    /// was written).
    pub async fn get_many(&self, ids: &[VideoId]) -> StoreResult<Vec<Video>> {
        let mut videos = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.store.get(COLLECTION, id.as_str()).await {
                videos.push(record_to_video(&record)?);
            }
        }
        Ok(videos)
    }

    /// Update title, description, category and visibility. Only the
    /// provided fields change; `updated_at` is always bumped.
    pub async fn update_details(
        &self,
        id: &VideoId,
        title: Option<String>,
        description: Option<String>,
        category_id: Option<CategoryId>,
        visibility: Option<VideoVisibility>,
    ) -> StoreResult<()> {
        let mut fields = HashMap::new();
        if let Some(title) = title {
            fields.insert("title".to_string(), title.to_store_value());
        }
        if let Some(description) = description {
            fields.insert("description".to_string(), description.to_store_value());
        }
        if let Some(category_id) = category_id {
            fields.insert("category_id".to_string(), category_id.as_str().to_store_value());
        }
        if let Some(visibility) = visibility {
            fields.insert("visibility".to_string(), visibility.as_str().to_store_value());
        }
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Record the provider asset id issued for a fresh upload.
    pub async fn set_asset_created(&self, id: &VideoId, asset_id: &str) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("asset_id".to_string(), asset_id.to_store_value());
        fields.insert(
            "asset_status".to_string(),
            AssetStatus::Preparing.as_str().to_store_value(),
        );
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Apply the provider's asset-ready notification.
    pub async fn set_asset_ready(
        &self,
        id: &VideoId,
        playback_id: &str,
        duration_secs: Option<f64>,
        thumbnail_url: &str,
        preview_url: &str,
    ) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "asset_status".to_string(),
            AssetStatus::Ready.as_str().to_store_value(),
        );
        fields.insert("playback_id".to_string(), playback_id.to_store_value());
        fields.insert("duration_secs".to_string(), duration_secs.to_store_value());
        fields.insert("thumbnail_url".to_string(), thumbnail_url.to_store_value());
        fields.insert("preview_url".to_string(), preview_url.to_store_value());
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Mark the asset as failed at the provider.
    pub async fn set_asset_errored(&self, id: &VideoId) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "asset_status".to_string(),
            AssetStatus::Errored.as_str().to_store_value(),
        );
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Replace the thumbnail URL (AI regeneration or manual upload).
    pub async fn set_thumbnail_url(&self, id: &VideoId, url: &str) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("thumbnail_url".to_string(), url.to_store_value());
        fields.insert("updated_at".to_string(), Utc::now().to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Bump the denormalized view counter by one.
    pub async fn increment_view_count(&self, id: &VideoId) -> StoreResult<()> {
        let record = self
            .store
            .get(COLLECTION, id.as_str())
            .await
            .ok_or_else(|| StoreError::not_found(format!("videos/{}", id)))?;
        let count: i64 = record.get_opt("view_count").unwrap_or(0);
        let mut fields = HashMap::new();
        fields.insert("view_count".to_string(), (count + 1).to_store_value());
        self.store.patch(COLLECTION, id.as_str(), fields).await
    }

    /// Delete a video record. Returns whether it existed.
    pub async fn delete(&self, id: &VideoId) -> bool {
        self.store.delete(COLLECTION, id.as_str()).await
    }

    /// Public feed: newest public videos first, optionally scoped to a
    /// category.
    pub async fn list_public(
        &self,
        category_id: Option<&CategoryId>,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<Video>> {
        let filter = Filter::new()
            .eq("visibility", VideoVisibility::Public.as_str())
            .maybe_eq("category_id", category_id.map(|c| c.as_str()));
        let page = fetch_page(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("created_at"),
            cursor,
            limit,
        )
        .await?;
        page_to_videos(page)
    }

    /// Trending feed: public videos by descending view count.
    pub async fn list_trending(
        &self,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<Video>> {
        let filter = Filter::new().eq("visibility", VideoVisibility::Public.as_str());
        let page = fetch_page(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("view_count"),
            cursor,
            limit,
        )
        .await?;
        page_to_videos(page)
    }

    /// Subscriptions feed: newest public videos from the given
    /// creators. An empty creator set yields an empty final page
    /// without touching the collection order; the limit is still
    /// validated first, like every other listing.
    pub async fn list_by_owners(
        &self,
        owner_ids: BTreeSet<String>,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<Video>> {
        validate_limit(limit)?;
        if owner_ids.is_empty() {
            return Ok(Page::empty());
        }
        let filter = Filter::new()
            .eq("visibility", VideoVisibility::Public.as_str())
            .field_in("owner_id", owner_ids);
        let page = fetch_page(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("created_at"),
            cursor,
            limit,
        )
        .await?;
        page_to_videos(page)
    }

    /// Studio listing: everything the owner has, drafts and private
    /// videos included, newest first.
    pub async fn list_owned(
        &self,
        owner_id: &UserId,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<Video>> {
        let filter = Filter::new().eq("owner_id", owner_id.as_str());
        let page = fetch_page(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("created_at"),
            cursor,
            limit,
        )
        .await?;
        page_to_videos(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> Video {
        let mut video = Video::new(UserId::from_string("user-1"), "My first video");
        video.description = Some("A description".to_string());
        video.category_id = Some(CategoryId::from_string("cat-1"));
        video.visibility = VideoVisibility::Public;
        video.view_count = 7;
        video
    }

    #[test]
    fn test_video_conversion_round_trip() {
        let video = sample_video();
        let record = Record::new(video.id.as_str(), video_to_fields(&video));
        let restored = record_to_video(&record).unwrap();

        assert_eq!(restored.id, video.id);
        assert_eq!(restored.owner_id, video.owner_id);
        assert_eq!(restored.title, video.title);
        assert_eq!(restored.description, video.description);
        assert_eq!(restored.category_id, video.category_id);
        assert_eq!(restored.visibility, video.visibility);
        assert_eq!(restored.asset_status, video.asset_status);
        assert_eq!(restored.view_count, 7);
        assert_eq!(restored.created_at, video.created_at);
    }

    #[test]
    fn test_conversion_rejects_unknown_visibility() {
        let video = sample_video();
        let mut fields = video_to_fields(&video);
        fields.insert("visibility".to_string(), "unlisted".to_store_value());
        let record = Record::new(video.id.as_str(), fields);
        assert!(matches!(
            record_to_video(&record),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_public_feed_excludes_private_videos() {
        let store = Arc::new(MemoryStore::new());
        let repo = VideoRepository::new(store);

        let public = sample_video();
        let mut private = Video::new(UserId::from_string("user-1"), "Draft");
        private.visibility = VideoVisibility::Private;
        repo.create(&public).await.unwrap();
        repo.create(&private).await.unwrap();

        let page = repo.list_public(None, None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, public.id);

        let owned = repo
            .list_owned(&UserId::from_string("user-1"), None, 10)
            .await
            .unwrap();
        assert_eq!(owned.items.len(), 2);
    }

    #[tokio::test]
    async fn test_trending_orders_by_view_count() {
        let store = Arc::new(MemoryStore::new());
        let repo = VideoRepository::new(store);

        for (title, views) in [("low", 3), ("high", 50), ("mid", 10)] {
            let mut video = Video::new(UserId::from_string("user-1"), title);
            video.visibility = VideoVisibility::Public;
            video.view_count = views;
            repo.create(&video).await.unwrap();
        }

        let page = repo.list_trending(None, 10).await.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn test_empty_owner_set_short_circuits() {
        let store = Arc::new(MemoryStore::new());
        let repo = VideoRepository::new(store);
        repo.create(&sample_video()).await.unwrap();

        let page = repo.list_by_owners(BTreeSet::new(), None, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_empty_owner_set_still_validates_limit() {
        let store = Arc::new(MemoryStore::new());
        let repo = VideoRepository::new(store);

        for limit in [0, 101] {
            assert!(matches!(
                repo.list_by_owners(BTreeSet::new(), None, limit).await,
                Err(StoreError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_increment_view_count() {
        let store = Arc::new(MemoryStore::new());
        let repo = VideoRepository::new(store);
        let video = sample_video();
        repo.create(&video).await.unwrap();

        repo.increment_view_count(&video.id).await.unwrap();
        let restored = repo.get(&video.id).await.unwrap().unwrap();
        assert_eq!(restored.view_count, 8);
    }
}
