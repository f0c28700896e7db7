use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Op {
    /// Evaluate `lhs <op> rhs`.
    pub fn test<T: Ord + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        let ord = lhs.cmp(rhs);
        match self {
            Op::Equal => ord == Ordering::Equal,
            Op::NotEqual => ord != Ordering::Equal,
            Op::GreaterThan => ord == Ordering::Greater,
            Op::GreaterThanOrEqual => ord != Ordering::Less,
            Op::LessThan => ord == Ordering::Less,
            Op::LessThanOrEqual => ord != Ordering::Greater,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::Equal => "=",
            Op::NotEqual => "!=",
            Op::GreaterThan => ">",
            Op::GreaterThanOrEqual => ">=",
            Op::LessThan => "<",
            Op::LessThanOrEqual => "<=",
        })
    }
}

/// Opaque entry predicate.
#[derive(Clone)]
pub struct FilterFn(Arc<dyn Fn(&Entry) -> bool + Send + Sync>);

impl FilterFn {
    pub fn new(f: impl Fn(&Entry) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FilterFn(..)")
    }
}

#[derive(Debug, Clone)]
pub enum Filter {
    /// Compare the entry key with `key`.
    KeyCompare { op: Op, key: String },
    /// Compare the entry value bytes with `value`; a missing value compares
    /// as empty.
    ValueCompare { op: Op, value: Vec<u8> },
    /// Entry key starts with the given string.
    KeyPrefix(String),
    Custom(FilterFn),
}

impl Filter {
    pub fn key_compare(op: Op, key: impl Into<String>) -> Self {
        Filter::KeyCompare {
            op,
            key: key.into(),
        }
    }

    pub fn value_compare(op: Op, value: impl Into<Vec<u8>>) -> Self {
        Filter::ValueCompare {
            op,
            value: value.into(),
        }
    }

    pub fn key_prefix(prefix: impl Into<String>) -> Self {
        Filter::KeyPrefix(prefix.into())
    }

    pub fn custom(f: impl Fn(&Entry) -> bool + Send + Sync + 'static) -> Self {
        Filter::Custom(FilterFn::new(f))
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::KeyCompare { op, key } => op.test(entry.key.as_str(), key.as_str()),
            Filter::ValueCompare { op, value } => op.test(entry.value_bytes(), value.as_slice()),
            Filter::KeyPrefix(prefix) => entry.key.starts_with(prefix.as_str()),
            Filter::Custom(f) => (f.0)(entry),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::KeyCompare { op, key } => write!(f, "KEY {op} {key:?}"),
            Filter::ValueCompare { op, value } => {
                write!(f, "VALUE {op} {:?}", String::from_utf8_lossy(value))
            }
            Filter::KeyPrefix(prefix) => write!(f, "PREFIX({prefix:?})"),
            Filter::Custom(_) => f.write_str("CUSTOM"),
        }
    }
}
