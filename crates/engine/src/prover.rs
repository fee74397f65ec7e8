//! Query-safety prover
//!
//! Decides whether a query's full result set is provably contained in, and
//! derivable from, the documents the prefetcher loaded. The proof is checked
//! against the prior cycle's memory (what was actually prefetched), never
//! against lookups recorded during the current request.
//!
//! The reasoning mirrors what the prefetcher guarantees: a leaf lookup on a
//! memory field whose values were all recorded under the in-scope locale is
//! a superset bound of the true answer. A conjunction needs only one safe
//! conjunct, because the remaining conjuncts can only narrow the result and
//! are applied in-memory anyway. A disjunction is never safe: proving it
//! would require every disjunct to be independently safe, which in practice
//! blocks nearly everything, so it fails closed outright.
//!
//! Total over any input: malformed or unrecognized criteria are unsafe,
//! never a crash.

use routefetch_core::{Criteria, Projection};
use routefetch_memory::memory::is_memory_field;
use routefetch_memory::{detect_locale, Locale, QueryMemory};

/// Whether a query can be answered entirely from the prefetched set
///
/// `memory` is the snapshot the prefetch was built from; absent memory means
/// nothing was prefetched, so nothing can be proven.
pub fn compatible(
    criteria: &Criteria,
    projection: &Projection,
    memory: Option<&QueryMemory>,
    locale_field: &str,
) -> bool {
    compatible_in_locale(criteria, projection, memory, locale_field, None)
}

/// `compatible` with the detector's top-level result overridden
///
/// Supports the per-query locale override hook; subtree conjunctions still
/// re-detect their own locale.
pub fn compatible_in_locale(
    criteria: &Criteria,
    projection: &Projection,
    memory: Option<&QueryMemory>,
    locale_field: &str,
    locale: Option<&Locale>,
) -> bool {
    let Some(memory) = memory else {
        return false;
    };
    if projection.is_unsupported() {
        return false;
    }
    let locale = match locale {
        Some(locale) => locale.clone(),
        None => detect_locale(criteria, locale_field),
    };
    criteria_safe(criteria, &locale, memory, locale_field)
}

fn criteria_safe(
    criteria: &Criteria,
    locale: &Locale,
    memory: &QueryMemory,
    locale_field: &str,
) -> bool {
    match criteria {
        Criteria::And(clauses) => {
            let inner = detect_locale(criteria, locale_field);
            let current = if inner.is_none() { locale.clone() } else { inner };
            clauses
                .iter()
                .any(|clause| criteria_safe(clause, &current, memory, locale_field))
        }
        // fail closed; see module docs
        Criteria::Or(_) => false,
        Criteria::Eq(field, value) if is_memory_field(field.as_str()) => {
            memory.contains(locale, field.as_str(), value)
        }
        Criteria::In(field, values) if is_memory_field(field.as_str()) => {
            memory.contains_all(locale, field.as_str(), values)
        }
        // Exists, non-memory leaves, Unsupported: nothing to prove against
        _ => false,
    }
}
