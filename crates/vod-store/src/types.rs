//! Record and scalar value types.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Scalar field value stored in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(i64),
    DoubleValue(f64),
    TimestampValue(DateTime<Utc>),
    StringValue(String),
}

impl Value {
    /// Rank used to order values of different variants. Within a
    /// variant, the natural order of the payload applies.
    fn type_rank(&self) -> u8 {
        match self {
            Value::NullValue(_) => 0,
            Value::BooleanValue(_) => 1,
            Value::IntegerValue(_) => 2,
            Value::DoubleValue(_) => 3,
            Value::TimestampValue(_) => 4,
            Value::StringValue(_) => 5,
        }
    }

    /// Total order over values: variant rank first, payload second.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::BooleanValue(a), Value::BooleanValue(b)) => a.cmp(b),
            (Value::IntegerValue(a), Value::IntegerValue(b)) => a.cmp(b),
            (Value::DoubleValue(a), Value::DoubleValue(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Value::TimestampValue(a), Value::TimestampValue(b)) => a.cmp(b),
            (Value::StringValue(a), Value::StringValue(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    /// Whether the value is non-null.
    pub fn is_set(&self) -> bool {
        !matches!(self, Value::NullValue(()))
    }
}

/// A stored record: unique id plus scalar fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique id within the collection
    pub id: String,
    /// Scalar fields
    pub fields: HashMap<String, Value>,
}

impl Record {
    /// Create a new record with the given id and fields.
    pub fn new(id: impl Into<String>, fields: HashMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Get a field value, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a required field of a given type, failing with `InvalidRecord`.
    pub fn require<T: FromStoreValue>(&self, key: &str) -> StoreResult<T> {
        self.fields
            .get(key)
            .and_then(T::from_store_value)
            .ok_or_else(|| {
                StoreError::invalid_record(format!("missing or mistyped field '{}'", key))
            })
    }

    /// Get an optional field of a given type; null and absent both map to `None`.
    pub fn get_opt<T: FromStoreValue>(&self, key: &str) -> Option<T> {
        self.fields.get(key).and_then(T::from_store_value)
    }
}

/// Convert a Rust value to a store value.
pub trait ToStoreValue {
    fn to_store_value(&self) -> Value;
}

impl ToStoreValue for String {
    fn to_store_value(&self) -> Value {
        Value::StringValue(self.clone())
    }
}

impl ToStoreValue for &str {
    fn to_store_value(&self) -> Value {
        Value::StringValue(self.to_string())
    }
}

impl ToStoreValue for i64 {
    fn to_store_value(&self) -> Value {
        Value::IntegerValue(*self)
    }
}

impl ToStoreValue for i32 {
    fn to_store_value(&self) -> Value {
        Value::IntegerValue(*self as i64)
    }
}

impl ToStoreValue for u32 {
    fn to_store_value(&self) -> Value {
        Value::IntegerValue(*self as i64)
    }
}

impl ToStoreValue for f64 {
    fn to_store_value(&self) -> Value {
        Value::DoubleValue(*self)
    }
}

impl ToStoreValue for bool {
    fn to_store_value(&self) -> Value {
        Value::BooleanValue(*self)
    }
}

impl ToStoreValue for DateTime<Utc> {
    fn to_store_value(&self) -> Value {
        Value::TimestampValue(*self)
    }
}

impl<T: ToStoreValue> ToStoreValue for Option<T> {
    fn to_store_value(&self) -> Value {
        match self {
            Some(v) => v.to_store_value(),
            None => Value::NullValue(()),
        }
    }
}

/// Convert a store value to a Rust type.
pub trait FromStoreValue: Sized {
    fn from_store_value(value: &Value) -> Option<Self>;
}

impl FromStoreValue for String {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromStoreValue for i64 {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::IntegerValue(i) => Some(*i),
            Value::DoubleValue(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl FromStoreValue for f64 {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::DoubleValue(f) => Some(*f),
            Value::IntegerValue(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromStoreValue for bool {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::BooleanValue(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromStoreValue for DateTime<Utc> {
    fn from_store_value(value: &Value) -> Option<Self> {
        match value {
            Value::TimestampValue(t) => Some(*t),
            _ => None,
        }
    }
}
