//! Emulation and orchestration engine for routefetch
//!
//! This crate implements the read-path optimization on top of the data
//! model (`routefetch-core`) and the learned state (`routefetch-memory`):
//! - prover: decides whether a query is answerable from the prefetched set
//! - engine: in-memory filter/sort/skip-limit/projection emulation
//! - prefetch: turns learned memory into one batched store query
//! - context: per-request document cache and next-cycle memory
//! - facade: the `Optimizer` callers drive around their request lifecycle
//! - store: the async `DocumentStore` boundary plus an in-memory reference
//!   implementation
//! - stats: passive serve counters
//!
//! Disabling or failing any part of this crate never changes a query's
//! result, only its latency; correctness always has the real store as its
//! floor.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod engine;
pub mod facade;
pub mod prefetch;
pub mod prover;
pub mod stats;
pub mod store;

pub use context::RequestContext;
pub use facade::{Optimizer, OptimizerConfig};
pub use stats::{OptimizerStats, StatsSnapshot};
pub use store::{DocumentStore, MemoryDocumentStore};

// Re-export the model and memory types callers need alongside the engine.
pub use routefetch_core::{
    Criteria, DocId, Document, Error, FieldPath, FindOptions, Projection, Result, SortOrder,
    SortSpec, ID_FIELD,
};
pub use routefetch_memory::{
    detect_locale, Locale, QueryMemory, RouteMemoryStore, DEFAULT_ROUTE_CAPACITY, MEMORY_FIELDS,
};
