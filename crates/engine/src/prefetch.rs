//! Prefetch planning and execution
//!
//! Turns the previous cycle's memory for a route into one batched store
//! query and loads the results into the per-request document cache. Purely
//! an optimization: a store failure here makes the caller drop the route's
//! memory and the request proceeds on fallback queries alone.

use crate::store::DocumentStore;
use routefetch_core::{Criteria, DocId, Document, FindOptions};
use routefetch_memory::QueryMemory;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Build the batched prefetch query for a route's memory
///
/// One `$in` clause per remembered field per locale partition. A clause
/// from a non-sentinel partition additionally requires the locale field to
/// equal that locale or be entirely absent, because documents with no
/// locale field are locale-agnostic and must stay visible under every
/// locale. Clauses combine with `$or`. Returns `None` when the memory
/// yields no clauses (first visit): no prefetch at all.
pub fn plan(memory: &QueryMemory, locale_field: &str) -> Option<Criteria> {
    let mut clauses: Vec<Criteria> = Vec::new();
    for (locale, fields) in memory.partitions() {
        for (field, values) in fields.iter() {
            if values.is_empty() {
                continue;
            }
            let lookup = Criteria::is_in(field.as_str(), values.clone());
            let clause = match locale.value() {
                Some(value) => Criteria::and(vec![
                    lookup,
                    Criteria::or(vec![
                        Criteria::eq(locale_field, Value::String(value.to_string())),
                        Criteria::exists(locale_field, false),
                    ]),
                ]),
                None => lookup,
            };
            clauses.push(clause);
        }
    }
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(Criteria::Or(clauses)),
    }
}

/// Run the prefetch and key the results by identifier
///
/// Returns `None` on store error (logged, never fatal): the caller must
/// then treat the route's memory as absent, because with nothing fetched
/// the cache is no superset of anything and no proof may succeed. A query
/// that legitimately matched zero documents still returns `Some(empty)`.
/// Documents without a string `_id` are skipped (they could never be
/// invalidated or deduplicated).
pub async fn prefetch(
    store: &dyn DocumentStore,
    memory: &QueryMemory,
    locale_field: &str,
) -> Option<HashMap<DocId, Document>> {
    let Some(criteria) = plan(memory, locale_field) else {
        return Some(HashMap::new());
    };
    let docs = match store.find(&criteria, &FindOptions::new()).await {
        Ok(docs) => docs,
        Err(error) => {
            warn!(target: "routefetch::prefetch", %error, "prefetch failed, proceeding without cache");
            return None;
        }
    };
    let mut cache = HashMap::with_capacity(docs.len());
    for doc in docs {
        match doc.id() {
            Some(id) => {
                cache.insert(id, doc);
            }
            None => {
                debug!(target: "routefetch::prefetch", "skipping prefetched document without identifier");
            }
        }
    }
    debug!(target: "routefetch::prefetch", docs = cache.len(), "prefetched documents");
    Some(cache)
}
