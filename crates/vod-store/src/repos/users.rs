//! User repository.

use std::collections::HashMap;
use std::sync::Arc;

use vod_models::{User, UserId};

use crate::error::StoreResult;
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "users";

fn user_to_fields(user: &User) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("handle".to_string(), user.handle.to_store_value());
    fields.insert("display_name".to_string(), user.display_name.to_store_value());
    fields.insert("image_url".to_string(), user.image_url.to_store_value());
    fields.insert("created_at".to_string(), user.created_at.to_store_value());
    fields
}

fn record_to_user(record: &Record) -> StoreResult<User> {
    Ok(User {
        id: UserId::from_string(record.id.clone()),
        handle: record.require("handle")?,
        display_name: record.require("display_name")?,
        image_url: record.get_opt("image_url"),
        created_at: record.require("created_at")?,
    })
}

/// Repository for user profiles mirrored from the identity provider.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<MemoryStore>,
}

impl UserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Insert or refresh a profile. Identity webhooks replay, so this
    /// is always an upsert keyed on the provider's durable user id.
    pub async fn upsert(&self, user: &User) {
        let record = Record::new(user.id.as_str(), user_to_fields(user));
        self.store.upsert(COLLECTION, record).await;
    }

    pub async fn get(&self, id: &UserId) -> StoreResult<Option<User>> {
        match self.store.get(COLLECTION, id.as_str()).await {
            Some(record) => Ok(Some(record_to_user(&record)?)),
            None => Ok(None),
        }
    }

    /// Resolve a profile by its URL-safe handle.
    pub async fn find_by_handle(&self, handle: &str) -> StoreResult<Option<User>> {
        let filter = Filter::new().eq("handle", handle);
        match self.store.find_one(COLLECTION, &filter).await {
            Some(record) => Ok(Some(record_to_user(&record)?)),
            None => Ok(None),
        }
    }
}
