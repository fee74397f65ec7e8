//! Data model for routefetch
//!
//! This crate defines the types shared by every layer:
//! - Document: JSON document with identifier and dotted-path access
//! - Criteria: tagged criteria tree (the emulated store query subset)
//! - Projection / SortSpec / FindOptions: the rest of the query surface
//! - Error: error taxonomy for the whole system
//!
//! Nothing here talks to a store or holds cross-request state; those live in
//! `routefetch-memory` and `routefetch-engine`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod criteria;
pub mod document;
pub mod error;
pub mod query;

pub use criteria::Criteria;
pub use document::{DocId, Document, FieldPath, ID_FIELD};
pub use error::{Error, Result};
pub use query::{FindOptions, Projection, SortOrder, SortSpec};
