use std::fmt;

use crate::filter::Filter;
use crate::order::Order;

/// A structured prefix query.
///
/// `offset` and `limit` count entries that passed every filter. A `limit`
/// of 0 means unbounded.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub prefix: String,
    pub filters: Vec<Filter>,
    pub orders: Vec<Order>,
    pub limit: usize,
    pub offset: usize,
    pub keys_only: bool,
    /// Accepted for compatibility; stores without TTLs ignore it.
    pub return_expirations: bool,
    pub return_sizes: bool,
}

impl Query {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }
}

/// `SELECT keys,vals FROM "/a" FILTER [KEY > "/a/1"] ORDER [desc(KEY)] OFFSET 1 LIMIT 2`
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT keys")?;
        if !self.keys_only {
            f.write_str(",vals")?;
        }
        if self.return_sizes {
            f.write_str(",sizes")?;
        }
        if self.return_expirations {
            f.write_str(",exps")?;
        }
        if !self.prefix.is_empty() {
            write!(f, " FROM {:?}", self.prefix)?;
        }
        if !self.filters.is_empty() {
            f.write_str(" FILTER ")?;
            write_list(f, &self.filters)?;
        }
        if !self.orders.is_empty() {
            f.write_str(" ORDER ")?;
            write_list(f, &self.orders)?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        if self.limit > 0 {
            write!(f, " LIMIT {}", self.limit)?;
        }
        Ok(())
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}
