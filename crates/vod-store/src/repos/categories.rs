//! Category repository.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use vod_models::category::DEFAULT_CATEGORIES;
use vod_models::{Category, CategoryId};

use crate::error::StoreResult;
use crate::filter::Filter;
use crate::memory::{MemoryStore, Query};
use crate::paginate::Order;
use crate::types::{Record, ToStoreValue, Value};

const COLLECTION: &str = "categories";

fn category_to_fields(category: &Category) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), category.name.to_store_value());
    fields.insert("description".to_string(), category.description.to_store_value());
    fields.insert("created_at".to_string(), category.created_at.to_store_value());
    fields
}

fn record_to_category(record: &Record) -> StoreResult<Category> {
    Ok(Category {
        id: CategoryId::from_string(record.id.clone()),
        name: record.require("name")?,
        description: record.get_opt("description"),
        created_at: record.require("created_at")?,
    })
}

/// Repository for the fixed browsing categories.
#[derive(Clone)]
pub struct CategoryRepository {
    store: Arc<MemoryStore>,
}

impl CategoryRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Seed the default category set on first boot. A non-empty
    /// collection is left untouched.
    pub async fn seed_defaults(&self) -> StoreResult<()> {
        if self.store.count_where(COLLECTION, &Filter::new()).await > 0 {
            return Ok(());
        }
        for name in DEFAULT_CATEGORIES {
            let category = Category::new(*name, None);
            let record = Record::new(category.id.as_str(), category_to_fields(&category));
            self.store.insert(COLLECTION, record).await?;
        }
        info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
        Ok(())
    }

    /// Get a category by id.
    pub async fn get(&self, id: &CategoryId) -> StoreResult<Option<Category>> {
        match self.store.get(COLLECTION, id.as_str()).await {
            Some(record) => Ok(Some(record_to_category(&record)?)),
            None => Ok(None),
        }
    }

    /// The full category set, alphabetical. Small and fixed, so this
    /// listing is not paginated.
    pub async fn list_all(&self) -> StoreResult<Vec<Category>> {
        let query = Query {
            filter: Filter::new(),
            order: Order::asc("name"),
            start_after: None,
            limit: None,
            aggregates: Vec::new(),
        };
        let rows = self.store.query(COLLECTION, &query).await;
        rows.iter().map(record_to_category).collect()
    }
}
