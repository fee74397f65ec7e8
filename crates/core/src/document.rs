//! Document model
//!
//! This module defines:
//! - Document: a JSON object owned by the authoritative store
//! - DocId: the document identifier (`_id` field)
//! - FieldPath: a dotted path into a document (e.g. `body.items.0.type`)
//!
//! The cache layer only ever holds independently-cloned documents, never
//! aliases into store-owned data; `Document: Clone` is a deep clone because
//! `serde_json::Value` owns its tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the identifier field every document carries
pub const ID_FIELD: &str = "_id";

/// Document identifier
///
/// Identifiers are opaque strings assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Create an identifier from a string
    pub fn new(id: impl Into<String>) -> Self {
        DocId(id.into())
    }

    /// View the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        DocId(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        DocId(s)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dotted path into a document
///
/// Segments are separated by `.`; a segment that parses as an integer
/// indexes into an array. `FieldPath::new("a.b")` resolves `{"a": {"b": 1}}`
/// to `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// Create a path from its dotted form
    pub fn new(path: impl Into<String>) -> Self {
        FieldPath(path.into())
    }

    /// The dotted form of the path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path's segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The first segment (the top-level field name)
    pub fn head(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath(s.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A JSON document
///
/// Newtype over a `serde_json` object. The store owns the authoritative
/// copies; everything this system hands out is a clone, so caller mutations
/// never corrupt a cache or another caller's result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Create a document from a JSON object map
    pub fn from_object(fields: Map<String, Value>) -> Self {
        Document(fields)
    }

    /// Create a document from an arbitrary JSON value
    ///
    /// Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Document(fields)),
            _ => None,
        }
    }

    /// The document's identifier, if it has a string `_id`
    pub fn id(&self) -> Option<DocId> {
        self.0.get(ID_FIELD).and_then(Value::as_str).map(DocId::from)
    }

    /// Get a top-level field
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Resolve a dotted path into the document
    ///
    /// Walks objects by key and arrays by integer index. An explicit JSON
    /// `null` resolves to `Some(Null)`; a missing field resolves to `None`.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.segments();
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(obj) => obj.get(segment)?,
                Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a top-level field, replacing any existing value
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Remove a top-level field
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// Keep only the listed top-level fields, plus the identifier
    ///
    /// The identifier field is always retained, listed or not.
    pub fn retain_fields(&mut self, fields: &[String]) {
        self.0
            .retain(|name, _| name == ID_FIELD || fields.iter().any(|f| f == name));
    }

    /// Remove the listed top-level fields
    ///
    /// The identifier field is never removed, listed or not.
    pub fn remove_fields(&mut self, fields: &[String]) {
        for field in fields {
            if field != ID_FIELD {
                self.0.remove(field);
            }
        }
    }

    /// Names of the document's top-level fields
    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying object map
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying object map
    pub fn into_object(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Document(fields)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}
