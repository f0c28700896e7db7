use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;

/// Opaque entry comparator.
#[derive(Clone)]
pub struct OrderFn(Arc<dyn Fn(&Entry, &Entry) -> Ordering + Send + Sync>);

impl OrderFn {
    pub fn new(f: impl Fn(&Entry, &Entry) -> Ordering + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for OrderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrderFn(..)")
    }
}

/// Ordering criterion. Only the two key orders can be served by a store
/// scan; the rest need the entries in memory.
#[derive(Debug, Clone)]
pub enum Order {
    ByKey,
    ByKeyDescending,
    ByValue,
    ByValueDescending,
    ByFunction(OrderFn),
}

impl Order {
    pub fn by_function(f: impl Fn(&Entry, &Entry) -> Ordering + Send + Sync + 'static) -> Self {
        Order::ByFunction(OrderFn::new(f))
    }

    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            Order::ByKey => a.key.cmp(&b.key),
            Order::ByKeyDescending => b.key.cmp(&a.key),
            Order::ByValue => a.value_bytes().cmp(b.value_bytes()),
            Order::ByValueDescending => b.value_bytes().cmp(a.value_bytes()),
            Order::ByFunction(f) => (f.0)(a, b),
        }
    }

    pub fn is_key_order(&self) -> bool {
        matches!(self, Order::ByKey | Order::ByKeyDescending)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::ByKey => "KEY",
            Order::ByKeyDescending => "desc(KEY)",
            Order::ByValue => "VALUE",
            Order::ByValueDescending => "desc(VALUE)",
            Order::ByFunction(_) => "FN",
        })
    }
}

/// Compare by each order in turn; the first non-equal result wins.
pub fn compare_entries(orders: &[Order], a: &Entry, b: &Entry) -> Ordering {
    orders
        .iter()
        .map(|order| order.compare(a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort: entries that compare equal keep their relative order.
pub fn sort_entries(orders: &[Order], entries: &mut [Entry]) {
    if orders.is_empty() {
        return;
    }
    entries.sort_by(|a, b| compare_entries(orders, a, b));
}
