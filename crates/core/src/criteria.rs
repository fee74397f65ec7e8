//! Criteria trees
//!
//! This module defines the tagged criteria tree over which the prover and
//! the in-memory engine pattern-match:
//! - Eq: exact field equality
//! - In: field membership in a value set
//! - Exists: field presence test
//! - And / Or: boolean combinators
//! - Unsupported: anything else, carried verbatim so both consumers can
//!   fail closed instead of shape-sniffing at runtime
//!
//! `Criteria::parse` accepts the store's JSON criteria shape and never
//! errors; unrecognized operators parse to `Unsupported`. `Criteria::to_value`
//! is the inverse, used when a planned query is sent to the real store.

use crate::document::FieldPath;
use serde_json::{json, Map, Value};

/// A node in a criteria tree
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// `{field: value}`, exact match
    Eq(FieldPath, Value),
    /// `{field: {"$in": [...]}}`, membership
    In(FieldPath, Vec<Value>),
    /// `{field: {"$exists": bool}}`, presence test
    Exists(FieldPath, bool),
    /// `{"$and": [...]}`, conjunction (also implicit multi-key objects)
    And(Vec<Criteria>),
    /// `{"$or": [...]}`, disjunction
    Or(Vec<Criteria>),
    /// Anything outside the emulated subset, raw payload preserved
    Unsupported(Value),
}

impl Criteria {
    /// Exact-match criteria on a field
    pub fn eq(field: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Criteria::Eq(field.into(), value.into())
    }

    /// Membership criteria on a field
    pub fn is_in(field: impl Into<FieldPath>, values: Vec<Value>) -> Self {
        Criteria::In(field.into(), values)
    }

    /// Presence criteria on a field
    pub fn exists(field: impl Into<FieldPath>, present: bool) -> Self {
        Criteria::Exists(field.into(), present)
    }

    /// Conjunction of criteria
    pub fn and(clauses: Vec<Criteria>) -> Self {
        Criteria::And(clauses)
    }

    /// Disjunction of criteria
    pub fn or(clauses: Vec<Criteria>) -> Self {
        Criteria::Or(clauses)
    }

    /// Parse the store's JSON criteria shape into a tree
    ///
    /// Total: malformed input becomes `Unsupported`, never an error. An
    /// object with several keys parses to the implicit conjunction of its
    /// entries, matching store semantics.
    pub fn parse(value: &Value) -> Criteria {
        let Some(object) = value.as_object() else {
            return Criteria::Unsupported(value.clone());
        };
        let mut clauses: Vec<Criteria> = Vec::with_capacity(object.len());
        for (key, entry) in object {
            clauses.push(Self::parse_entry(key, entry));
        }
        match clauses.len() {
            1 => clauses.remove(0),
            // {} matches every document: an empty conjunction
            _ => Criteria::And(clauses),
        }
    }

    fn parse_entry(key: &str, entry: &Value) -> Criteria {
        match key {
            "$and" => Self::parse_list(key, entry, Criteria::And),
            "$or" => Self::parse_list(key, entry, Criteria::Or),
            _ if key.starts_with('$') => Criteria::Unsupported(json!({ key: entry })),
            _ => Self::parse_field(key, entry),
        }
    }

    fn parse_list(key: &str, entry: &Value, build: fn(Vec<Criteria>) -> Criteria) -> Criteria {
        match entry.as_array() {
            Some(items) => build(items.iter().map(Criteria::parse).collect()),
            None => Criteria::Unsupported(json!({ key: entry })),
        }
    }

    fn parse_field(field: &str, entry: &Value) -> Criteria {
        let Some(object) = entry.as_object() else {
            return Criteria::eq(field, entry.clone());
        };
        if !object.keys().any(|k| k.starts_with('$')) {
            // embedded document, compared whole
            return Criteria::eq(field, entry.clone());
        }
        if object.len() != 1 {
            // combined operators ({$gte, $lte} style) are outside the subset
            return Criteria::Unsupported(json!({ field: entry }));
        }
        match object.iter().next() {
            Some((op, value)) if op == "$in" => match value.as_array() {
                Some(items) => Criteria::is_in(field, items.to_vec()),
                None => Criteria::Unsupported(json!({ field: entry })),
            },
            Some((op, value)) if op == "$exists" => match value.as_bool() {
                Some(present) => Criteria::exists(field, present),
                None => Criteria::Unsupported(json!({ field: entry })),
            },
            _ => Criteria::Unsupported(json!({ field: entry })),
        }
    }

    /// Serialize back to the store's JSON criteria shape
    pub fn to_value(&self) -> Value {
        match self {
            Criteria::Eq(field, value) => json!({ field.as_str(): value }),
            Criteria::In(field, values) => json!({ field.as_str(): { "$in": values } }),
            Criteria::Exists(field, present) => {
                json!({ field.as_str(): { "$exists": present } })
            }
            Criteria::And(clauses) => {
                json!({ "$and": clauses.iter().map(Criteria::to_value).collect::<Vec<_>>() })
            }
            Criteria::Or(clauses) => {
                json!({ "$or": clauses.iter().map(Criteria::to_value).collect::<Vec<_>>() })
            }
            Criteria::Unsupported(raw) => raw.clone(),
        }
    }

    /// Short description of the node's operator, for diagnostics
    pub fn operator_name(&self) -> String {
        match self {
            Criteria::Eq(..) => "$eq".to_string(),
            Criteria::In(..) => "$in".to_string(),
            Criteria::Exists(..) => "$exists".to_string(),
            Criteria::And(..) => "$and".to_string(),
            Criteria::Or(..) => "$or".to_string(),
            Criteria::Unsupported(raw) => raw
                .as_object()
                .and_then(unsupported_operator)
                .unwrap_or_else(|| raw.to_string()),
        }
    }
}

fn unsupported_operator(object: &Map<String, Value>) -> Option<String> {
    let (key, entry) = object.iter().next()?;
    if key.starts_with('$') {
        return Some(key.clone());
    }
    entry
        .as_object()
        .and_then(|inner| inner.keys().find(|k| k.starts_with('$')))
        .cloned()
}
