//! Keyset pagination engine.
//!
//! Every list endpoint pages through its collection the same way: a
//! deterministic total order over `(sort key, id)` both descending, a
//! cursor naming the last row of the previous page, a strict tie-broken
//! boundary predicate, and a `limit + 1` fetch to learn whether another
//! page exists. The sort key is not unique (two videos can share an
//! `updated_at` instant), so the id tie-break is what guarantees that
//! no row is skipped or repeated across page boundaries.

use std::cmp::Ordering;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::filter::Filter;
use crate::memory::{CountAggregate, MemoryStore, Query};
use crate::types::{Record, Value};

/// Pagination limits.
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Primary sort value of a record: either a timestamp (recency-style
/// listings) or an integer count (trending).
///
/// Serialized untagged so cursors carry a bare RFC 3339 string or a
/// bare integer, matching the wire shape callers round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortKey {
    Count(i64),
    Timestamp(DateTime<Utc>),
}

impl SortKey {
    /// Extract a sort key from a stored value. Returns `None` for
    /// values that cannot participate in a keyset ordering.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(i) => Some(SortKey::Count(*i)),
            Value::TimestampValue(t) => Some(SortKey::Timestamp(*t)),
            _ => None,
        }
    }
}

/// Boundary of the last returned page.
///
/// Opaque to callers beyond round-tripping: it must be compared only
/// against the collection and ordering that produced it. A cursor
/// applied to the wrong ordering is not detected; it yields a
/// well-ordered but arbitrary slice rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Id of the last retained row
    pub id: String,
    /// Sort value of the last retained row
    #[serde(rename = "sortKey")]
    pub sort_key: SortKey,
}

impl Cursor {
    /// Create a new cursor.
    pub fn new(id: impl Into<String>, sort_key: SortKey) -> Self {
        Self {
            id: id.into(),
            sort_key,
        }
    }

    /// Encode to a URL-safe token.
    pub fn encode(&self) -> String {
        // Serialization of this shape cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode from a URL-safe token.
    pub fn decode(token: &str) -> StoreResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| StoreError::validation("malformed cursor token"))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| StoreError::validation("malformed cursor token"))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

/// Declares the primary sort field and its direction. The record id is
/// always the implicit secondary key, same direction.
#[derive(Debug, Clone)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    /// Descending order on the given field (every production listing).
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Ascending order on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    /// Compare two `(sort key, id)` pairs under this order. Missing or
    /// non-sortable keys sort last.
    pub fn cmp_keys(
        &self,
        a: (Option<SortKey>, &str),
        b: (Option<SortKey>, &str),
    ) -> Ordering {
        let primary = match (a.0, b.0) {
            (Some(ka), Some(kb)) => match self.direction {
                Direction::Descending => kb.cmp(&ka),
                Direction::Ascending => ka.cmp(&kb),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        primary.then_with(|| match self.direction {
            Direction::Descending => b.1.cmp(a.1),
            Direction::Ascending => a.1.cmp(b.1),
        })
    }

    /// The keyset boundary predicate: true when `(key, id)` lies
    /// strictly after the cursor in this order. Strict on both keys:
    /// `<=` on either would repeat the boundary row on the next page.
    pub fn after_cursor(&self, key: Option<SortKey>, id: &str, cursor: &Cursor) -> bool {
        let Some(key) = key else {
            // Rows without a sort key sort after every cursor
            return true;
        };
        match self.direction {
            Direction::Descending => {
                key < cursor.sort_key || (key == cursor.sort_key && id < cursor.id.as_str())
            }
            Direction::Ascending => {
                key > cursor.sort_key || (key == cursor.sort_key && id > cursor.id.as_str())
            }
        }
    }
}

/// One page of results plus the cursor for the next.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// An empty final page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Map items into another type, keeping the cursor.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// Validate a caller-supplied page size. Out-of-range limits are a
/// constraint violation rejected before any store access.
pub fn validate_limit(limit: u32) -> StoreResult<u32> {
    if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(StoreError::validation(format!(
            "limit must be between {} and {}, got {}",
            MIN_PAGE_SIZE, MAX_PAGE_SIZE, limit
        )));
    }
    Ok(limit)
}

/// Fetch one page of `collection` rows matching `filter` under `order`.
///
/// Issues a single read capped at `limit + 1` rows. The extra row only
/// signals that another page exists; it is trimmed before returning
/// and the next cursor is derived from the last retained row. For a
/// static collection, chaining the returned cursors enumerates every
/// matching row exactly once and ends with `next_cursor = None`.
pub async fn fetch_page(
    store: &MemoryStore,
    collection: &str,
    filter: Filter,
    order: Order,
    cursor: Option<Cursor>,
    limit: u32,
) -> StoreResult<Page<Record>> {
    fetch_page_with(store, collection, filter, order, cursor, limit, Vec::new()).await
}

/// Like [`fetch_page`], with count aggregates attached to each row
/// inside the same store read.
#[allow(clippy::too_many_arguments)]
pub async fn fetch_page_with(
    store: &MemoryStore,
    collection: &str,
    filter: Filter,
    order: Order,
    cursor: Option<Cursor>,
    limit: u32,
    aggregates: Vec<CountAggregate>,
) -> StoreResult<Page<Record>> {
    let limit = validate_limit(limit)? as usize;

    let query = Query {
        filter,
        order: order.clone(),
        start_after: cursor,
        limit: Some(limit + 1),
        aggregates,
    };
    let mut rows = store.query(collection, &query).await;

    let has_more = rows.len() > limit;
    rows.truncate(limit);

    let next_cursor = if has_more {
        let last = rows.last().expect("non-empty after truncate to limit >= 1");
        let key = last
            .get(&order.field)
            .and_then(SortKey::from_value)
            .ok_or_else(|| {
                StoreError::invalid_record(format!(
                    "row '{}' has no sortable '{}' field",
                    last.id, order.field
                ))
            })?;
        Some(Cursor::new(last.id.clone(), key))
    } else {
        None
    };

    debug!(
        collection,
        rows = rows.len(),
        has_more,
        "fetched page"
    );

    Ok(Page {
        items: rows,
        next_cursor,
    })
}
