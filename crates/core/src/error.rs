//! Error types for routefetch
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Two of the three failure classes in the system are not represented here at
//! all: a failed safety proof is a routing decision (a `bool`), and a
//! prefetch failure silently degrades the request to store-only serving.
//! The variants below cover what remains.

use thiserror::Error;

/// Result type alias for routefetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for routefetch
#[derive(Debug, Error)]
pub enum Error {
    /// The in-memory engine met an operator it cannot evaluate.
    ///
    /// The facade treats this exactly like a failed safety proof (fall back
    /// to the store); it reaching a caller means the caller invoked the
    /// engine without consulting the prover first.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// The authoritative store failed.
    ///
    /// Propagated unchanged on direct and fallback queries; swallowed (with
    /// a warning) during prefetch.
    #[error("store error: {0}")]
    Store(String),

    /// A document is missing its identifier or is otherwise unusable.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
