//! Serve counters
//!
//! Passive observability: which side answered each query and how long each
//! side took. Counters never influence routing decisions.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Atomic counters shared across requests
#[derive(Debug, Default)]
pub struct OptimizerStats {
    cache_serves: AtomicU64,
    store_serves: AtomicU64,
    prefetches: AtomicU64,
    prefetched_docs: AtomicU64,
    writes: AtomicU64,
    cache_serve_ns: AtomicU64,
    store_serve_ns: AtomicU64,
}

impl OptimizerStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_cache_serve(&self, elapsed: Duration) {
        self.cache_serves.fetch_add(1, Ordering::Relaxed);
        self.cache_serve_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_store_serve(&self, elapsed: Duration) {
        self.store_serves.fetch_add(1, Ordering::Relaxed);
        self.store_serve_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_prefetch(&self, docs: usize) {
        self.prefetches.fetch_add(1, Ordering::Relaxed);
        self.prefetched_docs
            .fetch_add(docs as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// A point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_serves: self.cache_serves.load(Ordering::Relaxed),
            store_serves: self.store_serves.load(Ordering::Relaxed),
            prefetches: self.prefetches.load(Ordering::Relaxed),
            prefetched_docs: self.prefetched_docs.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            cache_serve_ns: self.cache_serve_ns.load(Ordering::Relaxed),
            store_serve_ns: self.store_serve_ns.load(Ordering::Relaxed),
        }
    }
}

/// Plain counter values for external reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Queries answered by the in-memory engine
    pub cache_serves: u64,
    /// Queries delegated to the store (first visits, failed proofs, fallbacks)
    pub store_serves: u64,
    /// Prefetches issued
    pub prefetches: u64,
    /// Documents loaded by prefetches
    pub prefetched_docs: u64,
    /// Writes routed through the optimizer
    pub writes: u64,
    /// Total nanoseconds spent serving from cache
    pub cache_serve_ns: u64,
    /// Total nanoseconds spent waiting on the store
    pub store_serve_ns: u64,
}
