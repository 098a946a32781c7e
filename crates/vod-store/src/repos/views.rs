//! Watch-history repository.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use vod_models::{UserId, VideoId, ViewEvent};

use crate::error::StoreResult;
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::paginate::{fetch_page, Cursor, Order, Page};
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "view_events";

fn view_to_fields(view: &ViewEvent) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("user_id".to_string(), view.user_id.as_str().to_store_value());
    fields.insert("video_id".to_string(), view.video_id.as_str().to_store_value());
    fields.insert("viewed_at".to_string(), view.viewed_at.to_store_value());
    fields
}

fn record_to_view(record: &Record) -> StoreResult<ViewEvent> {
    Ok(ViewEvent {
        id: record.id.clone(),
        user_id: UserId::from_string(record.require::<String>("user_id")?),
        video_id: VideoId::from_string(record.require::<String>("video_id")?),
        viewed_at: record.require("viewed_at")?,
    })
}

/// Repository for per-user watch history.
#[derive(Clone)]
pub struct ViewRepository {
    store: Arc<MemoryStore>,
}

impl ViewRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Record that the user watched the video. One row per
    /// (user, video): a re-watch refreshes `viewed_at` on the existing
    /// row instead of inserting a second one, so history stays
    /// deduplicated and ordered by recency. Returns whether the watch
    /// was the first for this pair.
    pub async fn record_view(&self, user_id: &UserId, video_id: &VideoId) -> StoreResult<bool> {
        let existing = Filter::new()
            .eq("user_id", user_id.as_str())
            .eq("video_id", video_id.as_str());
        if let Some(record) = self.store.find_one(COLLECTION, &existing).await {
            let mut fields = HashMap::new();
            fields.insert("viewed_at".to_string(), Utc::now().to_store_value());
            self.store.patch(COLLECTION, &record.id, fields).await?;
            return Ok(false);
        }
        let view = ViewEvent::new(user_id.clone(), video_id.clone());
        let record = Record::new(view.id.as_str(), view_to_fields(&view));
        self.store.insert(COLLECTION, record).await?;
        Ok(true)
    }

    /// One page of the user's history, most recently watched first.
    pub async fn list_history(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<ViewEvent>> {
        let filter = Filter::new().eq("user_id", user_id.as_str());
        let page = fetch_page(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("viewed_at"),
            cursor,
            limit,
        )
        .await?;
        let items = page
            .items
            .iter()
            .map(record_to_view)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Page {
            items,
            next_cursor: page.next_cursor,
        })
    }

    /// Drop every history row referencing a deleted video.
    pub async fn delete_for_video(&self, video_id: &VideoId) -> u64 {
        let filter = Filter::new().eq("video_id", video_id.as_str());
        self.store.delete_where(COLLECTION, &filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rewatch_refreshes_instead_of_duplicating() {
        let store = Arc::new(MemoryStore::new());
        let repo = ViewRepository::new(store);

        let user = UserId::from_string("user-1");
        let video = VideoId::from_string("video-1");

        assert!(repo.record_view(&user, &video).await.unwrap());
        let first = repo.list_history(&user, None, 10).await.unwrap();
        assert_eq!(first.items.len(), 1);
        let first_seen = first.items[0].viewed_at;

        assert!(!repo.record_view(&user, &video).await.unwrap());
        let second = repo.list_history(&user, None, 10).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.items[0].viewed_at >= first_seen);
    }

    #[tokio::test]
    async fn test_history_is_scoped_per_user() {
        let store = Arc::new(MemoryStore::new());
        let repo = ViewRepository::new(store);

        let video = VideoId::from_string("video-1");
        repo.record_view(&UserId::from_string("a"), &video).await.unwrap();
        repo.record_view(&UserId::from_string("b"), &video).await.unwrap();

        let page = repo
            .list_history(&UserId::from_string("a"), None, 10)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].user_id, UserId::from_string("a"));
    }

    #[tokio::test]
    async fn test_delete_for_video_clears_all_users() {
        let store = Arc::new(MemoryStore::new());
        let repo = ViewRepository::new(store);

        let video = VideoId::from_string("video-1");
        repo.record_view(&UserId::from_string("a"), &video).await.unwrap();
        repo.record_view(&UserId::from_string("b"), &video).await.unwrap();

        assert_eq!(repo.delete_for_video(&video).await, 2);
        let page = repo
            .list_history(&UserId::from_string("a"), None, 10)
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }
}
