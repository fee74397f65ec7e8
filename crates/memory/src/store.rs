//! Process-wide route memory store
//!
//! The only shared mutable state in the system: route key → last completed
//! cycle's query memory. Guarded by a single short-lived mutex; `lookup`
//! clones out so no lock is held while a request uses its snapshot.
//!
//! The map is LRU-bounded by route key (default 4096 routes) so a
//! long-running process with an unbounded route space cannot grow without
//! limit. `unbounded()` opts out.

use crate::memory::QueryMemory;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Default number of routes remembered before LRU eviction
pub const DEFAULT_ROUTE_CAPACITY: usize = 4096;

/// Route key → learned query memory, shared across requests
///
/// Construct one per process (or per test) and share it via `Arc`; there is
/// no ambient singleton. `replace` is last-writer-wins per key, which is the
/// whole consistency contract: concurrent requests to the same route race
/// benignly, each writing a complete snapshot.
#[derive(Debug)]
pub struct RouteMemoryStore {
    routes: Mutex<LruCache<String, QueryMemory>>,
}

impl RouteMemoryStore {
    /// Create a store bounded to `capacity` routes (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        RouteMemoryStore {
            routes: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Create a store that never evicts
    pub fn unbounded() -> Self {
        RouteMemoryStore {
            routes: Mutex::new(LruCache::unbounded()),
        }
    }

    /// The memory recorded for a route, if any
    ///
    /// Clones out and refreshes the route's LRU position.
    pub fn lookup(&self, route_key: &str) -> Option<QueryMemory> {
        self.routes.lock().get(route_key).cloned()
    }

    /// Replace a route's memory wholesale
    pub fn replace(&self, route_key: &str, memory: QueryMemory) {
        self.routes.lock().put(route_key.to_string(), memory);
    }

    /// Forget everything
    pub fn clear(&self) {
        self.routes.lock().clear();
    }

    /// Number of routes currently remembered
    pub fn len(&self) -> usize {
        self.routes.lock().len()
    }

    /// Whether no routes are remembered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RouteMemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_CAPACITY)
    }
}
