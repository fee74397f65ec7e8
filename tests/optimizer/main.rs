//! Integration suite for the read-path optimizer
//!
//! Each module drives the public `Optimizer` facade through full request
//! cycles against the in-memory reference store.


mod equivalence;
mod fail_closed;
mod invalidation;
mod lifecycle;
