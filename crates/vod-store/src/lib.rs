//! Datastore layer for the VOD Hub backend.
//!
//! This crate provides:
//! - Scalar value and record representation
//! - A conjunctive filter builder for optional predicates
//! - The keyset pagination engine used by every list endpoint
//! - An async in-memory datastore engine executing filtered,
//!   ordered, row-capped queries with count-aggregate attachment
//! - Typed repositories for every collection

pub mod error;
pub mod filter;
pub mod memory;
pub mod paginate;
pub mod repos;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use filter::Filter;
pub use memory::{CountAggregate, MemoryStore, Query};
pub use paginate::{
    fetch_page, fetch_page_with, Cursor, Direction, Order, Page, SortKey, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE, MIN_PAGE_SIZE,
};
pub use types::{FromStoreValue, Record, ToStoreValue, Value};
