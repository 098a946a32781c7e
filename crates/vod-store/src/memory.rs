//! In-memory datastore engine.
//!
//! Collections are maps of id to record behind an async RwLock. The
//! engine executes [`Query`] values: a conjunctive filter, a composite
//! `(sort field, id)` order, an optional keyset boundary, a row cap,
//! and named count-aggregate attachment. Reads never block writes
//! longer than the scan itself; the pagination layer is stateless
//! across calls.

use std::collections::{BTreeMap, HashMap};

use metrics::counter;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::paginate::{Cursor, Order, SortKey};
use crate::types::{Record, Value};

/// A per-row count aggregate: attaches
/// `count(collection where fk_field = row.id AND extra)` to each
/// result row as an integer field named `as_field`.
#[derive(Debug, Clone)]
pub struct CountAggregate {
    /// Name of the derived field on the result rows
    pub as_field: String,
    /// Collection to count in
    pub collection: String,
    /// Field in the counted collection holding the parent row id
    pub fk_field: String,
    /// Extra predicate on counted rows
    pub extra: Filter,
}

/// A read query against one collection.
#[derive(Debug, Clone)]
pub struct Query {
    /// Conjunctive predicate; empty matches everything
    pub filter: Filter,
    /// Composite order over `(field, id)`
    pub order: Order,
    /// Keyset boundary: only rows strictly after this cursor
    pub start_after: Option<Cursor>,
    /// Row cap applied after ordering
    pub limit: Option<usize>,
    /// Count aggregates attached to each result row
    pub aggregates: Vec<CountAggregate>,
}

impl Query {
    /// Query everything in `(field, id)` descending order.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            filter: Filter::new(),
            order: Order::desc(field),
            start_after: None,
            limit: None,
            aggregates: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_aggregate(mut self, aggregate: CountAggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }
}

type Collection = BTreeMap<String, Record>;

/// Async in-memory datastore.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new record. Fails with `Conflict` when the id exists.
    pub async fn insert(&self, collection: &str, record: Record) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();
        if coll.contains_key(&record.id) {
            return Err(StoreError::conflict(format!(
                "{}/{}",
                collection, record.id
            )));
        }
        counter!("store_writes_total", "op" => "insert").increment(1);
        coll.insert(record.id.clone(), record);
        Ok(())
    }

    /// Insert or replace a record.
    pub async fn upsert(&self, collection: &str, record: Record) {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();
        counter!("store_writes_total", "op" => "upsert").increment(1);
        coll.insert(record.id.clone(), record);
    }

    /// Get a record by id.
    pub async fn get(&self, collection: &str, id: &str) -> Option<Record> {
        let collections = self.collections.read().await;
        collections.get(collection).and_then(|c| c.get(id)).cloned()
    }

    /// Merge `fields` into an existing record. Fails with `NotFound`
    /// when the id is absent.
    pub async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: HashMap<String, Value>,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(format!("{}/{}", collection, id)))?;
        record.fields.extend(fields);
        counter!("store_writes_total", "op" => "patch").increment(1);
        Ok(())
    }

    /// Delete a record by id. Returns whether it existed.
    pub async fn delete(&self, collection: &str, id: &str) -> bool {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some();
        if removed {
            counter!("store_writes_total", "op" => "delete").increment(1);
        }
        removed
    }

    /// Delete every record matching `filter`. Returns the count removed.
    pub async fn delete_where(&self, collection: &str, filter: &Filter) -> u64 {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return 0;
        };
        let before = coll.len();
        coll.retain(|_, record| !filter.matches(record));
        let removed = (before - coll.len()) as u64;
        if removed > 0 {
            counter!("store_writes_total", "op" => "delete_where").increment(removed);
        }
        removed
    }

    /// Execute a read query: filter, keyset boundary, composite sort,
    /// row cap, aggregate attachment. Always a single pass over the
    /// collection plus one counting pass per aggregate per row.
    pub async fn query(&self, collection: &str, query: &Query) -> Vec<Record> {
        let collections = self.collections.read().await;
        counter!("store_queries_total").increment(1);

        let Some(coll) = collections.get(collection) else {
            return Vec::new();
        };

        let mut rows: Vec<&Record> = coll
            .values()
            .filter(|r| query.filter.matches(r))
            .filter(|r| match &query.start_after {
                Some(cursor) => {
                    let key = r.get(&query.order.field).and_then(SortKey::from_value);
                    query.order.after_cursor(key, &r.id, cursor)
                }
                None => true,
            })
            .collect();

        rows.sort_by(|a, b| {
            let ka = a.get(&query.order.field).and_then(SortKey::from_value);
            let kb = b.get(&query.order.field).and_then(SortKey::from_value);
            query.order.cmp_keys((ka, &a.id), (kb, &b.id))
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        let mut out: Vec<Record> = rows.into_iter().cloned().collect();

        for aggregate in &query.aggregates {
            for row in &mut out {
                let predicate = Filter::new().eq(&aggregate.fk_field, row.id.as_str());
                let count = collections
                    .get(&aggregate.collection)
                    .map(|c| {
                        c.values()
                            .filter(|r| predicate.matches(r) && aggregate.extra.matches(r))
                            .count() as i64
                    })
                    .unwrap_or(0);
                row.fields
                    .insert(aggregate.as_field.clone(), Value::IntegerValue(count));
            }
        }

        debug!(collection, rows = out.len(), "executed query");
        out
    }

    /// Count records matching `filter`.
    pub async fn count_where(&self, collection: &str, filter: &Filter) -> u64 {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.values().filter(|r| filter.matches(r)).count() as u64)
            .unwrap_or(0)
    }

    /// Whether any record matches `filter` (correlated existence check).
    pub async fn exists_where(&self, collection: &str, filter: &Filter) -> bool {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.values().any(|r| filter.matches(r)))
            .unwrap_or(false)
    }

    /// First record matching `filter` in id order, for unique lookups.
    pub async fn find_one(&self, collection: &str, filter: &Filter) -> Option<Record> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|c| c.values().find(|r| filter.matches(r)))
            .cloned()
    }
}
