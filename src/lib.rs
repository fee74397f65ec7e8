//! Routefetch - Route-level read-path prefetch cache for document stores
//!
//! Routefetch learns, per route, which document lookups a request performs,
//! prefetches those documents in a single batched query on the next visit,
//! and answers each fine-grained lookup from an in-process query engine
//! whenever a safety proof shows the prefetched set must contain every
//! matching document. Anything unprovable falls back to the store, so the
//! optimizer changes latency, never results.
//!
//! # Quick Start
//!
//! ```ignore
//! use routefetch::{Criteria, FindOptions, Optimizer, OptimizerConfig};
//!
//! let optimizer = Optimizer::new(store, OptimizerConfig::default());
//!
//! // per request
//! let mut ctx = optimizer.begin_request("/blog").await;
//! let posts = optimizer
//!     .find(&mut ctx, &Criteria::eq("slug", "/blog"), &FindOptions::new())
//!     .await?;
//! optimizer.end_request(ctx);
//! ```
//!
//! # Architecture
//!
//! Everything goes through the [`Optimizer`] facade, which owns the shared
//! route memory and drives the prefetch, prover, and engine per request.
//! Applications plug in their store behind the [`DocumentStore`] trait.

// Re-export the public API from routefetch-engine
pub use routefetch_engine::*;
