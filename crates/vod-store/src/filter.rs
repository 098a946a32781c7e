//! Conjunctive filter builder.
//!
//! List endpoints compose their predicates from optional caller input
//! (category present or not, owner scope or not). The builder folds
//! each optional clause into a conjunction so that an absent filter is
//! simply never added, instead of branching at every call site.

use std::collections::BTreeSet;

use crate::types::{Record, ToStoreValue, Value};

/// A single predicate clause.
#[derive(Debug, Clone)]
enum Clause {
    /// Field equals value
    Eq(String, Value),
    /// Field is present and non-null
    IsSet(String),
    /// Record id is a member of the given set
    IdIn(BTreeSet<String>),
    /// String field value is a member of the given set
    FieldIn(String, BTreeSet<String>),
}

impl Clause {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Clause::Eq(field, value) => record
                .get(field)
                .map(|v| v.total_cmp(value).is_eq())
                .unwrap_or(false),
            Clause::IsSet(field) => record.get(field).map(Value::is_set).unwrap_or(false),
            Clause::IdIn(ids) => ids.contains(&record.id),
            Clause::FieldIn(field, values) => match record.get(field) {
                Some(Value::StringValue(s)) => values.contains(s),
                _ => false,
            },
        }
    }
}

/// Conjunction of zero or more predicates. An empty filter matches
/// every record.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl ToStoreValue) -> Self {
        self.clauses
            .push(Clause::Eq(field.into(), value.to_store_value()));
        self
    }

    /// Require `field == value` when `value` is present; no-op otherwise.
    pub fn maybe_eq<T: ToStoreValue>(self, field: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    /// Require the field to be present and non-null.
    pub fn is_set(mut self, field: impl Into<String>) -> Self {
        self.clauses.push(Clause::IsSet(field.into()));
        self
    }

    /// Require the record id to be a member of `ids` (subquery-derived set).
    pub fn id_in(mut self, ids: BTreeSet<String>) -> Self {
        self.clauses.push(Clause::IdIn(ids));
        self
    }

    /// Require a string field to be a member of `values`.
    pub fn field_in(mut self, field: impl Into<String>, values: BTreeSet<String>) -> Self {
        self.clauses.push(Clause::FieldIn(field.into(), values));
        self
    }

    /// Evaluate the conjunction against a record.
    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Number of clauses (used by tests and logging).
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the filter has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(id: &str, pairs: &[(&str, Value)]) -> Record {
        let fields: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Record::new(id, fields)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let r = record("a", &[]);
        assert!(Filter::new().matches(&r));
    }

    #[test]
    fn test_eq_and_maybe_eq() {
        let r = record(
            "a",
            &[("visibility", Value::StringValue("public".to_string()))],
        );

        let filter = Filter::new()
            .eq("visibility", "public")
            .maybe_eq("category_id", None::<&str>);
        assert_eq!(filter.len(), 1);
        assert!(filter.matches(&r));

        let filter = Filter::new().maybe_eq("visibility", Some("private"));
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_is_set_rejects_null_and_absent() {
        let set = record("a", &[("category_id", Value::StringValue("c1".into()))]);
        let null = record("b", &[("category_id", Value::NullValue(()))]);
        let absent = record("c", &[]);

        let filter = Filter::new().is_set("category_id");
        assert!(filter.matches(&set));
        assert!(!filter.matches(&null));
        assert!(!filter.matches(&absent));
    }

    #[test]
    fn test_id_in_membership() {
        let filter = Filter::new().id_in(["a".to_string(), "b".to_string()].into());
        assert!(filter.matches(&record("a", &[])));
        assert!(!filter.matches(&record("z", &[])));
    }

    #[test]
    fn test_conjunction_requires_all_clauses() {
        let r = record(
            "a",
            &[
                ("owner_id", Value::StringValue("u1".into())),
                ("kind", Value::StringValue("like".into())),
            ],
        );
        let filter = Filter::new().eq("owner_id", "u1").eq("kind", "dislike");
        assert!(!filter.matches(&r));
    }
}
