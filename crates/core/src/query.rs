//! Query surface beyond criteria
//!
//! This module defines:
//! - Projection: flat inclusion-or-exclusion field map
//! - SortOrder / SortSpec: ordered multi-key sort
//! - FindOptions: everything a find call carries besides criteria
//!
//! A projection whose values are not plain boolean-ish flags (or that mixes
//! inclusion with exclusion) parses to `Projection::Unsupported`: such
//! projections imply store-computed fields the emulator cannot produce, so
//! the prover rejects them as unsafe. They are not an error.

use crate::document::FieldPath;
use serde_json::Value;

/// Flat field projection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// No projection: full documents
    #[default]
    None,
    /// Keep only the listed fields (identifier always included)
    Include(Vec<String>),
    /// Drop the listed fields (identifier never dropped)
    Exclude(Vec<String>),
    /// Cannot be emulated; the prover rejects it
    Unsupported,
}

impl Projection {
    /// Include only the given fields
    pub fn include(fields: &[&str]) -> Self {
        Projection::Include(fields.iter().map(|f| f.to_string()).collect())
    }

    /// Exclude the given fields
    pub fn exclude(fields: &[&str]) -> Self {
        Projection::Exclude(fields.iter().map(|f| f.to_string()).collect())
    }

    /// Parse the store's flat projection map
    ///
    /// Values must be uniformly truthy (inclusion) or uniformly falsy
    /// (exclusion); only booleans and `0`/`1` numbers qualify as flags.
    /// Anything else, including `$meta`-style nested values and mixed maps,
    /// parses to `Unsupported`.
    pub fn parse(value: &Value) -> Projection {
        let object = match value {
            Value::Null => return Projection::None,
            Value::Object(object) => object,
            _ => return Projection::Unsupported,
        };
        if object.is_empty() {
            return Projection::None;
        }
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for (field, flag) in object {
            match projection_flag(flag) {
                Some(true) => included.push(field.clone()),
                Some(false) => excluded.push(field.clone()),
                None => return Projection::Unsupported,
            }
        }
        match (included.is_empty(), excluded.is_empty()) {
            (false, true) => Projection::Include(included),
            (true, false) => Projection::Exclude(excluded),
            // mixed inclusion/exclusion is invalid input, rejected as unsafe
            _ => Projection::Unsupported,
        }
    }

    /// Whether this projection leaves documents untouched
    pub fn is_none(&self) -> bool {
        matches!(self, Projection::None)
    }

    /// Whether this projection cannot be emulated
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Projection::Unsupported)
    }
}

fn projection_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => Some(false),
            Some(_) => Some(true),
            None => None,
        },
        _ => None,
    }
}

/// Sort direction for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending (`1`)
    Asc,
    /// Descending (`-1`)
    Desc,
}

impl SortOrder {
    /// Parse a store sort direction (positive ascending, negative descending)
    pub fn from_direction(direction: i64) -> SortOrder {
        if direction < 0 {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Ordered multi-key sort specification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec(Vec<(FieldPath, SortOrder)>);

impl SortSpec {
    /// Empty specification (input order preserved)
    pub fn new() -> Self {
        SortSpec(Vec::new())
    }

    /// Start a specification with one key
    pub fn by(field: impl Into<FieldPath>, order: SortOrder) -> Self {
        SortSpec(vec![(field.into(), order)])
    }

    /// Append a lower-priority key
    pub fn then_by(mut self, field: impl Into<FieldPath>, order: SortOrder) -> Self {
        self.0.push((field.into(), order));
        self
    }

    /// Build from the store's ordered (field, direction) pairs
    pub fn from_pairs(pairs: &[(&str, i64)]) -> Self {
        SortSpec(
            pairs
                .iter()
                .map(|(field, direction)| {
                    (FieldPath::from(*field), SortOrder::from_direction(*direction))
                })
                .collect(),
        )
    }

    /// Iterate keys in priority order
    pub fn keys(&self) -> impl Iterator<Item = &(FieldPath, SortOrder)> {
        self.0.iter()
    }

    /// Whether no sort was requested
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Options accompanying a find call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindOptions {
    /// Field projection
    pub projection: Projection,
    /// Multi-key sort
    pub sort: SortSpec,
    /// Documents to skip before collecting results
    pub skip: usize,
    /// Maximum documents to return
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Default options: full documents, input order, no paging
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the projection
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set the sort
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// Set the skip offset
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Set the result limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
