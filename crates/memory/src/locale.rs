//! Locale detection
//!
//! A query's locale is the partition key under which its field lookups are
//! remembered. Detection is a pure read over the criteria tree: an exact
//! equality on the locale field yields an equality-derived locale, a `$in`
//! yields a membership-derived locale from its first element, and a
//! conjunction is searched in order, first hit wins. Anything else is the
//! "no locale" sentinel.
//!
//! Equality-derived and membership-derived locales are distinct partitions
//! even for the same value; the equality form renders with a `=` prefix so
//! the two can never collide as map keys.

use routefetch_core::Criteria;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Locale partition key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locale {
    /// The "no locale" sentinel
    None,
    /// Derived from exact equality on the locale field
    Eq(String),
    /// Derived from `$in` membership on the locale field
    Member(String),
}

impl Locale {
    /// Whether this is the sentinel
    pub fn is_none(&self) -> bool {
        matches!(self, Locale::None)
    }

    /// The underlying locale value, if any
    ///
    /// This is what prefetch clauses constrain the locale field against;
    /// the Eq/Member distinction only partitions the memory map.
    pub fn value(&self) -> Option<&str> {
        match self {
            Locale::None => None,
            Locale::Eq(value) | Locale::Member(value) => Some(value),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::None => Ok(()),
            Locale::Eq(value) => write!(f, "={value}"),
            Locale::Member(value) => f.write_str(value),
        }
    }
}

impl FromStr for Locale {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.strip_prefix('=') {
            Some(value) => Locale::Eq(value.to_string()),
            None if s.is_empty() => Locale::None,
            None => Locale::Member(s.to_string()),
        })
    }
}

// Locales key the memory map, so they serialize as their string form to
// stay usable as JSON object keys.
impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Locale::None))
    }
}

/// Extract the locale a criteria tree is constrained to
///
/// Pure and side-effect free. Conjunctions are searched depth-first in
/// clause order and the first non-sentinel result wins; callers get no
/// stronger tie-break guarantee than that.
pub fn detect_locale(criteria: &Criteria, locale_field: &str) -> Locale {
    match criteria {
        Criteria::Eq(field, Value::String(value)) if field.as_str() == locale_field => {
            Locale::Eq(value.clone())
        }
        Criteria::In(field, values) if field.as_str() == locale_field => values
            .first()
            .and_then(Value::as_str)
            .map(|value| Locale::Member(value.to_string()))
            .unwrap_or(Locale::None),
        Criteria::And(clauses) => clauses
            .iter()
            .map(|clause| detect_locale(clause, locale_field))
            .find(|locale| !locale.is_none())
            .unwrap_or(Locale::None),
        _ => Locale::None,
    }
}
