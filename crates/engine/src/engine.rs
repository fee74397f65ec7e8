//! In-memory query engine
//!
//! Emulates the store's query contract over an in-memory document set:
//! filter, multi-key stable sort, skip/limit, projection. The caller must
//! have obtained a safety proof first; on an operator outside the supported
//! subset the engine returns `Error::UnsupportedOperator`, which the facade
//! treats as "fall back to the store", never as fatal.
//!
//! Results are built from clones, so caller mutations cannot reach the
//! cache or any previously returned result.

use routefetch_core::{Criteria, Document, Error, FindOptions, Projection, Result, SortOrder, SortSpec};
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluate a query over an in-memory document set
///
/// Stages in store order: filter, sort, skip, limit, projection. Ties on
/// every sort key preserve filter-stage relative order.
pub fn evaluate<'a, I>(criteria: &Criteria, options: &FindOptions, docs: I) -> Result<Vec<Document>>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut matched: Vec<&Document> = Vec::new();
    for doc in docs {
        if matches(criteria, doc)? {
            matched.push(doc);
        }
    }
    if !options.sort.is_empty() {
        // sort_by is stable: equal-on-all-keys keeps filter order
        matched.sort_by(|a, b| compare_docs(a, b, &options.sort));
    }
    let selected = matched.into_iter().skip(options.skip);
    let selected: Vec<&Document> = match options.limit {
        Some(limit) => selected.take(limit).collect(),
        None => selected.collect(),
    };
    Ok(selected
        .into_iter()
        .map(|doc| {
            let mut doc = doc.clone();
            apply_projection(&mut doc, &options.projection);
            doc
        })
        .collect())
}

/// Whether a document satisfies a criteria tree
///
/// Errors on `Unsupported` nodes instead of guessing.
pub fn matches(criteria: &Criteria, doc: &Document) -> Result<bool> {
    match criteria {
        Criteria::Eq(field, value) => Ok(eq_matches(doc.get(field), value)),
        Criteria::In(field, values) => {
            let actual = doc.get(field);
            Ok(values.iter().any(|value| eq_matches(actual, value)))
        }
        Criteria::Exists(field, present) => Ok(doc.get(field).is_some() == *present),
        Criteria::And(clauses) => {
            for clause in clauses {
                if !matches(clause, doc)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Criteria::Or(clauses) => {
            for clause in clauses {
                if matches(clause, doc)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Criteria::Unsupported(_) => Err(Error::UnsupportedOperator(criteria.operator_name())),
    }
}

// Store equality: `null` matches a missing field, and an array field
// matches when any element matches (unless the target is itself an array,
// which must match whole).
fn eq_matches(actual: Option<&Value>, target: &Value) -> bool {
    match actual {
        None => target.is_null(),
        Some(actual) => {
            if values_equal(actual, target) {
                return true;
            }
            match actual {
                Value::Array(elements) if !target.is_array() => {
                    elements.iter().any(|element| values_equal(element, target))
                }
                _ => false,
            }
        }
    }
}

// Equality with numeric coercion: 1 == 1.0, matching the store rather than
// serde_json's strict variant equality.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => a == b,
    }
}

fn compare_docs(a: &Document, b: &Document, sort: &SortSpec) -> Ordering {
    for (field, order) in sort.keys() {
        let ordering = compare_values(a.get(field), b.get(field));
        let ordering = match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// Total order over JSON values: missing sorts with null, numbers compare
// numerically across int/float, and mixed types fall back to a fixed type
// rank so the comparator can never panic.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ordering = compare_values(Some(x), Some(y));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn apply_projection(doc: &mut Document, projection: &Projection) {
    match projection {
        Projection::None | Projection::Unsupported => {}
        Projection::Include(fields) => doc.retain_fields(fields),
        Projection::Exclude(fields) => doc.remove_fields(fields),
    }
}
