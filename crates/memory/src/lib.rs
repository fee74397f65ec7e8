//! Learned query memory for routefetch
//!
//! This crate holds the state that survives between requests to the same
//! route:
//! - Locale detection: derives a partition key from a criteria tree
//! - QueryMemory: per-locale field-value sets learned during one request
//! - RouteMemoryStore: process-wide route → memory map, LRU bounded
//!
//! Everything here is synchronous; the store is the system's only shared
//! mutable state and is safe under concurrent requests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod locale;
pub mod memory;
pub mod store;

pub use locale::{detect_locale, Locale};
pub use memory::{FieldValues, QueryMemory, MEMORY_FIELDS};
pub use store::{RouteMemoryStore, DEFAULT_ROUTE_CAPACITY};
