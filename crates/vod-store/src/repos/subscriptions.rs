//! Subscription repository.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use vod_models::{Subscription, UserId};

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::memory::{MemoryStore, Query};
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "subscriptions";

fn subscription_to_fields(subscription: &Subscription) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("viewer_id".to_string(), subscription.viewer_id.as_str().to_store_value());
    fields.insert("creator_id".to_string(), subscription.creator_id.as_str().to_store_value());
    fields.insert("created_at".to_string(), subscription.created_at.to_store_value());
    fields
}

fn record_to_subscription(record: &Record) -> StoreResult<Subscription> {
    Ok(Subscription {
        id: record.id.clone(),
        viewer_id: UserId::from_string(record.require::<String>("viewer_id")?),
        creator_id: UserId::from_string(record.require::<String>("creator_id")?),
        created_at: record.require("created_at")?,
    })
}

/// Repository for viewer-to-creator subscriptions.
#[derive(Clone)]
pub struct SubscriptionRepository {
    store: Arc<MemoryStore>,
}

impl SubscriptionRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Subscribe a viewer to a creator. Fails with `Conflict` when the
    /// subscription already exists, and with `Validation` on
    /// self-subscription.
    pub async fn create(&self, subscription: &Subscription) -> StoreResult<()> {
        if subscription.viewer_id == subscription.creator_id {
            return Err(StoreError::validation("cannot subscribe to yourself"));
        }
        let existing = Filter::new()
            .eq("viewer_id", subscription.viewer_id.as_str())
            .eq("creator_id", subscription.creator_id.as_str());
        if self.store.exists_where(COLLECTION, &existing).await {
            return Err(StoreError::conflict(format!(
                "already subscribed to {}",
                subscription.creator_id
            )));
        }
        let record = Record::new(subscription.id.as_str(), subscription_to_fields(subscription));
        self.store.insert(COLLECTION, record).await
    }

    /// Unsubscribe. Returns whether a subscription existed.
    pub async fn delete(&self, viewer_id: &UserId, creator_id: &UserId) -> bool {
        let filter = Filter::new()
            .eq("viewer_id", viewer_id.as_str())
            .eq("creator_id", creator_id.as_str());
        self.store.delete_where(COLLECTION, &filter).await > 0
    }

    /// Whether the viewer is subscribed to the creator.
    pub async fn exists(&self, viewer_id: &UserId, creator_id: &UserId) -> bool {
        let filter = Filter::new()
            .eq("viewer_id", viewer_id.as_str())
            .eq("creator_id", creator_id.as_str());
        self.store.exists_where(COLLECTION, &filter).await
    }

    /// Every creator the viewer is subscribed to, as a raw id set for
    /// feed filtering.
    pub async fn creator_ids_for(&self, viewer_id: &UserId) -> StoreResult<BTreeSet<String>> {
        let query = Query::desc("created_at")
            .with_filter(Filter::new().eq("viewer_id", viewer_id.as_str()));
        let rows = self.store.query(COLLECTION, &query).await;
        rows.iter()
            .map(|r| r.require::<String>("creator_id"))
            .collect()
    }

    /// How many viewers are subscribed to the creator.
    pub async fn subscriber_count(&self, creator_id: &UserId) -> u64 {
        let filter = Filter::new().eq("creator_id", creator_id.as_str());
        self.store.count_where(COLLECTION, &filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_conversion_round_trip() {
        let sub = Subscription::new(UserId::from_string("viewer"), UserId::from_string("creator"));
        let record = Record::new(sub.id.as_str(), subscription_to_fields(&sub));
        let restored = record_to_subscription(&record).unwrap();
        assert_eq!(restored.viewer_id, sub.viewer_id);
        assert_eq!(restored.creator_id, sub.creator_id);
    }

    #[tokio::test]
    async fn test_self_subscription_rejected() {
        let store = Arc::new(MemoryStore::new());
        let repo = SubscriptionRepository::new(store);
        let me = UserId::from_string("user-1");
        let sub = Subscription::new(me.clone(), me);
        assert!(matches!(
            repo.create(&sub).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_subscription_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let repo = SubscriptionRepository::new(store);

        let viewer = UserId::from_string("viewer");
        let creator = UserId::from_string("creator");
        repo.create(&Subscription::new(viewer.clone(), creator.clone()))
            .await
            .unwrap();
        assert!(matches!(
            repo.create(&Subscription::new(viewer.clone(), creator.clone())).await,
            Err(StoreError::Conflict(_))
        ));

        assert!(repo.exists(&viewer, &creator).await);
        assert_eq!(repo.subscriber_count(&creator).await, 1);
        assert!(repo.delete(&viewer, &creator).await);
        assert!(!repo.exists(&viewer, &creator).await);
    }

    #[tokio::test]
    async fn test_creator_ids_for_viewer() {
        let store = Arc::new(MemoryStore::new());
        let repo = SubscriptionRepository::new(store);

        let viewer = UserId::from_string("viewer");
        for creator in ["c1", "c2"] {
            repo.create(&Subscription::new(viewer.clone(), UserId::from_string(creator)))
                .await
                .unwrap();
        }

        let ids = repo.creator_ids_for(&viewer).await.unwrap();
        assert_eq!(ids, BTreeSet::from(["c1".to_string(), "c2".to_string()]));
    }
}
