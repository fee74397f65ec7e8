//! The query facade
//!
//! `Optimizer` is what applications drive around their request lifecycle:
//!
//! 1. `begin_request`: resolve the route key, prefetch from the route's
//!    learned memory into a fresh `RequestContext`
//! 2. `find` / `find_one`: per query, record its shape for the next cycle,
//!    ask the prover, serve from the in-memory engine when safe, delegate
//!    to the store otherwise
//! 3. `insert` / `update`: invalidate the cached copy before the write is
//!    acknowledged
//! 4. `end_request`: persist the accumulated memory for the next visit
//!
//! Failing or disabling any of this changes latency, never results.

use crate::context::RequestContext;
use crate::prefetch;
use crate::prover;
use crate::stats::OptimizerStats;
use crate::store::DocumentStore;
use crate::{engine, StatsSnapshot};
use routefetch_core::{Criteria, Document, Error, FindOptions, Result};
use routefetch_memory::{Locale, RouteMemoryStore, DEFAULT_ROUTE_CAPACITY, MEMORY_FIELDS};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Route-key hook: maps a request path to the key queries are learned under
pub type RouteKeyFn = dyn Fn(&str) -> String + Send + Sync;

/// Optimizer configuration
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Master switch; disabled means every query goes to the store
    pub enabled: bool,
    /// Field the locale detector inspects
    pub locale_field: String,
    /// When set, cache-served documents get this field set to `true`
    pub tag_field: Option<String>,
    /// Routes remembered before LRU eviction; `None` means unbounded
    pub route_capacity: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            enabled: true,
            locale_field: "workflowLocale".to_string(),
            tag_field: None,
            route_capacity: Some(DEFAULT_ROUTE_CAPACITY),
        }
    }
}

/// The read-path optimizer
///
/// One per process, shared across requests. All state beyond configuration
/// lives in the route memory store and in per-request contexts.
pub struct Optimizer {
    config: OptimizerConfig,
    routes: Arc<RouteMemoryStore>,
    store: Arc<dyn DocumentStore>,
    stats: Arc<OptimizerStats>,
    route_key_fn: Option<Box<RouteKeyFn>>,
}

impl Optimizer {
    /// Create an optimizer in front of a store
    pub fn new(store: Arc<dyn DocumentStore>, config: OptimizerConfig) -> Self {
        let routes = match config.route_capacity {
            Some(capacity) => RouteMemoryStore::new(capacity),
            None => RouteMemoryStore::unbounded(),
        };
        Optimizer {
            config,
            routes: Arc::new(routes),
            store,
            stats: Arc::new(OptimizerStats::new()),
            route_key_fn: None,
        }
    }

    /// Inject a route memory store (tests, shared lifecycles)
    pub fn with_route_memory(mut self, routes: Arc<RouteMemoryStore>) -> Self {
        self.routes = routes;
        self
    }

    /// Install a route-key hook, e.g. to fold a locale into the key
    pub fn with_route_key_fn(mut self, f: Box<RouteKeyFn>) -> Self {
        self.route_key_fn = Some(f);
        self
    }

    /// The route memory store in use
    pub fn routes(&self) -> &Arc<RouteMemoryStore> {
        &self.routes
    }

    /// Current counter values
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Start a request: resolve the route key and prefetch
    ///
    /// First visit to a route (no memory) skips the prefetch entirely; so
    /// does a disabled optimizer, which returns an inert context.
    pub async fn begin_request(&self, path: &str) -> RequestContext {
        if !self.config.enabled {
            return RequestContext::inert();
        }
        let route_key = match &self.route_key_fn {
            Some(f) => f(path),
            None => path.to_string(),
        };
        let (memory, cache) = match self.routes.lookup(&route_key) {
            Some(memory) => {
                match prefetch::prefetch(self.store.as_ref(), &memory, &self.config.locale_field)
                    .await
                {
                    Some(cache) => {
                        self.stats.record_prefetch(cache.len());
                        (Some(memory), cache)
                    }
                    // with nothing fetched the cache is a superset of
                    // nothing; drop the memory so no proof can pass
                    None => (None, HashMap::new()),
                }
            }
            None => {
                debug!(target: "routefetch::facade", route = %route_key, "no memory for route, skipping prefetch");
                (None, HashMap::new())
            }
        };
        RequestContext::new(route_key, memory, cache)
    }

    /// Run a query, from cache when provably safe, from the store otherwise
    pub async fn find(
        &self,
        ctx: &mut RequestContext,
        criteria: &Criteria,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        self.find_with_locale(ctx, criteria, options, None).await
    }

    /// `find` with the locale detector's result overridden for the proof
    pub async fn find_with_locale(
        &self,
        ctx: &mut RequestContext,
        criteria: &Criteria,
        options: &FindOptions,
        locale: Option<Locale>,
    ) -> Result<Vec<Document>> {
        if ctx.route_key.is_some() {
            ctx.next.record_query(criteria, &self.config.locale_field);
        }
        let proven = prover::compatible_in_locale(
            criteria,
            &options.projection,
            ctx.memory.as_ref(),
            &self.config.locale_field,
            locale.as_ref(),
        );
        if proven {
            let start = Instant::now();
            match self.serve_from_cache(ctx, criteria, options) {
                Ok(docs) => {
                    self.stats.record_cache_serve(start.elapsed());
                    return Ok(docs);
                }
                Err(error) => {
                    // prover accepted what the engine rejects; fall back
                    warn!(
                        target: "routefetch::facade",
                        %error,
                        "engine refused a proven query, falling back to store"
                    );
                }
            }
        }
        let start = Instant::now();
        let result = self.store.find(criteria, options).await;
        self.stats.record_store_serve(start.elapsed());
        result
    }

    /// Run a query and return its first result
    pub async fn find_one(
        &self,
        ctx: &mut RequestContext,
        criteria: &Criteria,
        options: &FindOptions,
    ) -> Result<Option<Document>> {
        let options = options.clone().limit(1);
        let docs = self.find(ctx, criteria, &options).await?;
        Ok(docs.into_iter().next())
    }

    /// Insert a document, invalidating any cached copy first
    pub async fn insert(&self, ctx: &mut RequestContext, doc: &Document) -> Result<()> {
        self.invalidate_for_write(ctx, doc)?;
        self.store.insert(doc).await
    }

    /// Update a document, invalidating any cached copy first
    pub async fn update(&self, ctx: &mut RequestContext, doc: &Document) -> Result<()> {
        self.invalidate_for_write(ctx, doc)?;
        self.store.update(doc).await
    }

    /// End a request: persist the accumulated memory for the next cycle
    ///
    /// Wholesale replacement; concurrent requests to the same route race
    /// benignly, last writer wins.
    pub fn end_request(&self, ctx: RequestContext) {
        if let Some(route_key) = ctx.route_key {
            self.routes.replace(&route_key, ctx.next);
        }
    }

    fn serve_from_cache(
        &self,
        ctx: &RequestContext,
        criteria: &Criteria,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        // identifier order keeps unsorted results deterministic, matching
        // the reference store
        let mut cached: Vec<&Document> = ctx.cache.values().collect();
        cached.sort_by(|a, b| a.id().cmp(&b.id()));
        let mut docs = engine::evaluate(criteria, options, cached)?;
        if let Some(tag_field) = &self.config.tag_field {
            for doc in &mut docs {
                doc.set_field(tag_field.clone(), Value::Bool(true));
            }
        }
        Ok(docs)
    }

    fn invalidate_for_write(&self, ctx: &mut RequestContext, doc: &Document) -> Result<()> {
        let id = doc
            .id()
            .ok_or_else(|| Error::InvalidDocument("write without string _id".to_string()))?;
        let evicted = ctx.invalidate(&id);
        // a proof resting on this document's lookup values must now fail,
        // or a later read in this request would see an empty cache where
        // the store has the fresh copy
        if let Some(memory) = ctx.memory.as_mut() {
            for copy in [evicted.as_ref(), Some(doc)].into_iter().flatten() {
                for field in MEMORY_FIELDS {
                    if let Some(value) = copy.get_field(field) {
                        memory.forget(field, value);
                    }
                }
            }
        }
        self.stats.record_write();
        Ok(())
    }
}
