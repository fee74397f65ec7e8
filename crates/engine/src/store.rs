//! The document store boundary
//!
//! `DocumentStore` is the async contract the optimizer sits in front of.
//! Every operation is a single future; cancellation and timeouts are
//! whatever the implementation's future does, this layer adds no policy of
//! its own and never retries.
//!
//! `MemoryDocumentStore` is the reference implementation: a lock-guarded
//! map evaluated with the same in-memory engine, supporting the full
//! operator subset. It backs the test suites and doubles as a conformance
//! check that cache-served and store-served answers agree.

use crate::engine;
use async_trait::async_trait;
use parking_lot::RwLock;
use routefetch_core::{Criteria, DocId, Document, Error, FindOptions, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Asynchronous contract with the authoritative document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a query against the store
    async fn find(&self, criteria: &Criteria, options: &FindOptions) -> Result<Vec<Document>>;

    /// Insert a document
    async fn insert(&self, doc: &Document) -> Result<()>;

    /// Update a document in place, matched by identifier
    async fn update(&self, doc: &Document) -> Result<()>;
}

/// In-memory reference store
///
/// Documents are held in identifier order so result order is deterministic
/// when no sort is requested. Find calls are counted so tests can assert
/// which side served a query.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<BTreeMap<DocId, Document>>,
    find_calls: AtomicUsize,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a batch of JSON documents, each of which must carry a string `_id`
    pub fn seed(&self, docs: Vec<Value>) -> Result<()> {
        let mut guard = self.docs.write();
        for value in docs {
            let doc = Document::from_value(value)
                .ok_or_else(|| Error::InvalidDocument("not a JSON object".to_string()))?;
            let id = doc
                .id()
                .ok_or_else(|| Error::InvalidDocument("missing string _id".to_string()))?;
            guard.insert(id, doc);
        }
        Ok(())
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// How many times `find` ran against this store
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::Relaxed)
    }

    /// Reset the find counter
    pub fn reset_find_calls(&self) {
        self.find_calls.store(0, Ordering::Relaxed);
    }

    /// Fetch a document by identifier (test convenience)
    pub fn get(&self, id: &DocId) -> Option<Document> {
        self.docs.read().get(id).cloned()
    }

    /// Insert without identifier validation (test convenience)
    pub fn insert_raw(&self, value: Value) {
        if let Some(doc) = Document::from_value(value) {
            let id = doc.id().unwrap_or_else(|| DocId::new(""));
            self.docs.write().insert(id, doc);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, criteria: &Criteria, options: &FindOptions) -> Result<Vec<Document>> {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        let guard = self.docs.read();
        engine::evaluate(criteria, options, guard.values())
    }

    async fn insert(&self, doc: &Document) -> Result<()> {
        let id = doc
            .id()
            .ok_or_else(|| Error::InvalidDocument("missing string _id".to_string()))?;
        self.docs.write().insert(id, doc.clone());
        Ok(())
    }

    async fn update(&self, doc: &Document) -> Result<()> {
        let id = doc
            .id()
            .ok_or_else(|| Error::InvalidDocument("missing string _id".to_string()))?;
        let mut guard = self.docs.write();
        if !guard.contains_key(&id) {
            return Err(Error::Store(format!("no document with _id {id}")));
        }
        guard.insert(id, doc.clone());
        Ok(())
    }
}
