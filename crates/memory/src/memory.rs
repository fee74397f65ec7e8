//! Per-route query memory
//!
//! During a request the facade records every equality and `$in` lookup on
//! the memory fields, partitioned by the query's detected locale. At request
//! end the accumulated memory replaces the route's previous snapshot and
//! drives the next visit's prefetch.

use crate::locale::{detect_locale, Locale};
use routefetch_core::Criteria;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The unique-ish fields worth remembering lookups on
pub const MEMORY_FIELDS: [&str; 3] = ["_id", "slug", "path"];

/// Whether a criteria field participates in query memory
pub fn is_memory_field(field: &str) -> bool {
    MEMORY_FIELDS.contains(&field)
}

/// Observed values per memory field, within one locale partition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValues(HashMap<String, Vec<Value>>);

impl FieldValues {
    /// Record one observed value (push-if-absent; duplicates are harmless,
    /// dedup is only an optimization)
    pub fn record(&mut self, field: &str, value: Value) {
        let values = self.0.entry(field.to_string()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Observed values for a field
    pub fn values(&self, field: &str) -> Option<&[Value]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether a single value was observed for a field
    pub fn contains(&self, field: &str, value: &Value) -> bool {
        self.0
            .get(field)
            .is_some_and(|values| values.contains(value))
    }

    /// Whether every given value was observed for a field
    pub fn contains_all(&self, field: &str, values: &[Value]) -> bool {
        values.iter().all(|value| self.contains(field, value))
    }

    /// Forget one observed value for a field
    pub fn forget(&mut self, field: &str, value: &Value) {
        if let Some(values) = self.0.get_mut(field) {
            values.retain(|observed| observed != value);
        }
    }

    /// Iterate (field, observed values) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Value>)> {
        self.0.iter()
    }

    /// Whether nothing was observed
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// One request cycle's learned lookups for a route
///
/// Mapping locale → field → observed values. Mutated only by the owning
/// request; replaces the route's prior snapshot wholesale at request end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMemory {
    partitions: HashMap<Locale, FieldValues>,
}

impl QueryMemory {
    /// Empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observed value under a locale partition
    pub fn record(&mut self, locale: &Locale, field: &str, value: Value) {
        self.partitions
            .entry(locale.clone())
            .or_default()
            .record(field, value);
    }

    /// Record every memory-field lookup a query makes
    ///
    /// Detects the locale per subtree the same way the prover does, so a
    /// recorded lookup always lands in the partition a later proof will
    /// consult. Disjunct branches are recorded too: remembering more than
    /// strictly needed only widens the prefetch, never the proof.
    pub fn record_query(&mut self, criteria: &Criteria, locale_field: &str) {
        let locale = detect_locale(criteria, locale_field);
        self.record_subtree(criteria, &locale, locale_field);
    }

    fn record_subtree(&mut self, criteria: &Criteria, locale: &Locale, locale_field: &str) {
        match criteria {
            Criteria::Eq(field, value) if is_memory_field(field.as_str()) => {
                if is_scalar(value) {
                    self.record(locale, field.as_str(), value.clone());
                }
            }
            Criteria::In(field, values) if is_memory_field(field.as_str()) => {
                for value in values.iter().filter(|value| is_scalar(value)) {
                    self.record(locale, field.as_str(), value.clone());
                }
            }
            Criteria::And(clauses) => {
                let inner = detect_locale(criteria, locale_field);
                let current = if inner.is_none() { locale.clone() } else { inner };
                for clause in clauses {
                    self.record_subtree(clause, &current, locale_field);
                }
            }
            Criteria::Or(clauses) => {
                for clause in clauses {
                    self.record_subtree(clause, locale, locale_field);
                }
            }
            _ => {}
        }
    }

    /// The field values observed under a locale
    pub fn partition(&self, locale: &Locale) -> Option<&FieldValues> {
        self.partitions.get(locale)
    }

    /// Whether a value was observed for a field under a locale
    pub fn contains(&self, locale: &Locale, field: &str, value: &Value) -> bool {
        self.partition(locale)
            .is_some_and(|fields| fields.contains(field, value))
    }

    /// Whether every given value was observed for a field under a locale
    pub fn contains_all(&self, locale: &Locale, field: &str, values: &[Value]) -> bool {
        self.partition(locale)
            .is_some_and(|fields| fields.contains_all(field, values))
    }

    /// Forget one observed value for a field, in every locale partition
    ///
    /// Used by write invalidation: once a document changes, queries
    /// constrained to its old or new field values can no longer be proven
    /// against the prefetched set, so the values must stop witnessing
    /// proofs for the rest of the request.
    pub fn forget(&mut self, field: &str, value: &Value) {
        for fields in self.partitions.values_mut() {
            fields.forget(field, value);
        }
    }

    /// Iterate (locale, field values) partitions
    pub fn partitions(&self) -> impl Iterator<Item = (&Locale, &FieldValues)> {
        self.partitions.iter()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(FieldValues::is_empty)
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
