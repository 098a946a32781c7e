//! Reaction repository.

use std::collections::HashMap;
use std::sync::Arc;

use vod_models::{Reaction, ReactionKind, UserId, VideoId};

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::paginate::{fetch_page, Cursor, Order, Page};
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "reactions";

fn reaction_to_fields(reaction: &Reaction) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("user_id".to_string(), reaction.user_id.as_str().to_store_value());
    fields.insert("video_id".to_string(), reaction.video_id.as_str().to_store_value());
    fields.insert("kind".to_string(), reaction.kind.as_str().to_store_value());
    fields.insert("reacted_at".to_string(), reaction.reacted_at.to_store_value());
    fields
}

fn record_to_reaction(record: &Record) -> StoreResult<Reaction> {
    let kind = record
        .require::<String>("kind")?
        .parse::<ReactionKind>()
        .map_err(|e| StoreError::invalid_record(e.to_string()))?;
    Ok(Reaction {
        id: record.id.clone(),
        user_id: UserId::from_string(record.require::<String>("user_id")?),
        video_id: VideoId::from_string(record.require::<String>("video_id")?),
        kind,
        reacted_at: record.require("reacted_at")?,
    })
}

/// Like and dislike totals for one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReactionCounts {
    pub likes: u64,
    pub dislikes: u64,
}

/// Repository for per-user video reactions.
#[derive(Clone)]
pub struct ReactionRepository {
    store: Arc<MemoryStore>,
}

impl ReactionRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// The user's current reaction to a video, if any.
    pub async fn find(&self, user_id: &UserId, video_id: &VideoId) -> StoreResult<Option<Reaction>> {
        let filter = Filter::new()
            .eq("user_id", user_id.as_str())
            .eq("video_id", video_id.as_str());
        match self.store.find_one(COLLECTION, &filter).await {
            Some(record) => Ok(Some(record_to_reaction(&record)?)),
            None => Ok(None),
        }
    }

    /// Set the user's reaction, replacing any previous one for the same
    /// video so the (user, video) pair stays unique.
    pub async fn set(&self, reaction: &Reaction) -> StoreResult<()> {
        let previous = Filter::new()
            .eq("user_id", reaction.user_id.as_str())
            .eq("video_id", reaction.video_id.as_str());
        self.store.delete_where(COLLECTION, &previous).await;
        let record = Record::new(reaction.id.as_str(), reaction_to_fields(reaction));
        self.store.insert(COLLECTION, record).await
    }

    /// Remove the user's reaction to a video. Returns whether one existed.
    pub async fn clear(&self, user_id: &UserId, video_id: &VideoId) -> bool {
        let filter = Filter::new()
            .eq("user_id", user_id.as_str())
            .eq("video_id", video_id.as_str());
        self.store.delete_where(COLLECTION, &filter).await > 0
    }

    /// Like and dislike totals for a video.
    pub async fn counts(&self, video_id: &VideoId) -> ReactionCounts {
        let likes = Filter::new()
            .eq("video_id", video_id.as_str())
            .eq("kind", ReactionKind::Like.as_str());
        let dislikes = Filter::new()
            .eq("video_id", video_id.as_str())
            .eq("kind", ReactionKind::Dislike.as_str());
        ReactionCounts {
            likes: self.store.count_where(COLLECTION, &likes).await,
            dislikes: self.store.count_where(COLLECTION, &dislikes).await,
        }
    }

    /// One page of the user's likes, most recent first.
    pub async fn list_liked(
        &self,
        user_id: &UserId,
        cursor: Option<Cursor>,
        limit: u32,
    ) -> StoreResult<Page<Reaction>> {
        let filter = Filter::new()
            .eq("user_id", user_id.as_str())
            .eq("kind", ReactionKind::Like.as_str());
        let page = fetch_page(
            &self.store,
            COLLECTION,
            filter,
            Order::desc("reacted_at"),
            cursor,
            limit,
        )
        .await?;
        let items = page
            .items
            .iter()
            .map(record_to_reaction)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Page {
            items,
            next_cursor: page.next_cursor,
        })
    }

    /// Drop every reaction referencing a deleted video.
    pub async fn delete_for_video(&self, video_id: &VideoId) -> u64 {
        let filter = Filter::new().eq("video_id", video_id.as_str());
        self.store.delete_where(COLLECTION, &filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_conversion_round_trip() {
        let reaction = Reaction::new(
            UserId::from_string("user-1"),
            VideoId::from_string("video-1"),
            ReactionKind::Dislike,
        );
        let record = Record::new(reaction.id.as_str(), reaction_to_fields(&reaction));
        let restored = record_to_reaction(&record).unwrap();
        assert_eq!(restored.user_id, reaction.user_id);
        assert_eq!(restored.kind, ReactionKind::Dislike);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_reaction() {
        let store = Arc::new(MemoryStore::new());
        let repo = ReactionRepository::new(store);

        let user = UserId::from_string("user-1");
        let video = VideoId::from_string("video-1");

        let like = Reaction::new(user.clone(), video.clone(), ReactionKind::Like);
        repo.set(&like).await.unwrap();
        assert_eq!(repo.counts(&video).await, ReactionCounts { likes: 1, dislikes: 0 });

        let dislike = Reaction::new(user.clone(), video.clone(), ReactionKind::Dislike);
        repo.set(&dislike).await.unwrap();
        assert_eq!(repo.counts(&video).await, ReactionCounts { likes: 0, dislikes: 1 });

        let current = repo.find(&user, &video).await.unwrap().unwrap();
        assert_eq!(current.kind, ReactionKind::Dislike);
    }

    #[tokio::test]
    async fn test_clear_reaction() {
        let store = Arc::new(MemoryStore::new());
        let repo = ReactionRepository::new(store);

        let user = UserId::from_string("user-1");
        let video = VideoId::from_string("video-1");
        let like = Reaction::new(user.clone(), video.clone(), ReactionKind::Like);
        repo.set(&like).await.unwrap();

        assert!(repo.clear(&user, &video).await);
        assert!(!repo.clear(&user, &video).await);
        assert!(repo.find(&user, &video).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_liked_listing_only_includes_likes() {
        let store = Arc::new(MemoryStore::new());
        let repo = ReactionRepository::new(store);

        let user = UserId::from_string("user-1");
        let liked = Reaction::new(user.clone(), VideoId::from_string("v1"), ReactionKind::Like);
        let disliked = Reaction::new(user.clone(), VideoId::from_string("v2"), ReactionKind::Dislike);
        repo.set(&liked).await.unwrap();
        repo.set(&disliked).await.unwrap();

        let page = repo.list_liked(&user, None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].video_id, VideoId::from_string("v1"));
    }
}
