//! Per-request state
//!
//! A `RequestContext` is exclusively owned by one request's execution and
//! never escapes it: the prefetched document cache, the memory snapshot the
//! prefetch was built from, and the next cycle's accumulating memory.
//! Nothing here needs synchronization.

use routefetch_core::{DocId, Document};
use routefetch_memory::QueryMemory;
use std::collections::HashMap;

/// State carried through one request
#[derive(Debug)]
pub struct RequestContext {
    pub(crate) route_key: Option<String>,
    /// Prior cycle's memory, the snapshot proofs run against
    pub(crate) memory: Option<QueryMemory>,
    /// Prefetched documents, keyed by identifier
    pub(crate) cache: HashMap<DocId, Document>,
    /// Lookups observed this cycle, persisted at request end
    pub(crate) next: QueryMemory,
}

impl RequestContext {
    pub(crate) fn new(
        route_key: String,
        memory: Option<QueryMemory>,
        cache: HashMap<DocId, Document>,
    ) -> Self {
        RequestContext {
            route_key: Some(route_key),
            memory,
            cache,
            next: QueryMemory::new(),
        }
    }

    /// A context that learns nothing and serves nothing from cache
    ///
    /// Used when the optimizer is disabled; every query falls through to
    /// the store and no memory is written back.
    pub(crate) fn inert() -> Self {
        RequestContext {
            route_key: None,
            memory: None,
            cache: HashMap::new(),
            next: QueryMemory::new(),
        }
    }

    /// The route key this request resolved to, if the optimizer is active
    pub fn route_key(&self) -> Option<&str> {
        self.route_key.as_deref()
    }

    /// Number of documents currently cached
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Whether an identifier is currently cached
    pub fn is_cached(&self, id: &DocId) -> bool {
        self.cache.contains_key(id)
    }

    /// Purge a document from the cache after a write affecting it
    ///
    /// The write invalidation rule: called before any insert or update is
    /// acknowledged, so a later read in this request can never see the
    /// stale cached copy. Returns the evicted copy, if one was cached.
    pub fn invalidate(&mut self, id: &DocId) -> Option<Document> {
        self.cache.remove(id)
    }
}
