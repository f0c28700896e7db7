use kvds_query::Order;
use kvds_store::IterDirection;

use crate::error::DatastoreError;

/// How a query's orders will be honored.
#[derive(Debug)]
pub(crate) enum Plan {
    /// The store scan order already is the requested order.
    Scan(IterDirection),
    /// Sort in memory. The key order, if any, is kept for the base scan.
    Fallback(Option<Order>),
}

pub(crate) fn resolve(orders: &[Order]) -> Result<Plan, DatastoreError> {
    match orders {
        [] | [Order::ByKey] => Ok(Plan::Scan(IterDirection::Forward)),
        [Order::ByKeyDescending] => Ok(Plan::Scan(IterDirection::Backward)),
        [_] => Ok(Plan::Fallback(None)),
        _ => {
            let mut key_orders = orders.iter().filter(|o| o.is_key_order());
            match (key_orders.next(), key_orders.next()) {
                (Some(_), Some(_)) => Err(DatastoreError::IncompatibleOrders(describe(orders))),
                (base, _) => Ok(Plan::Fallback(base.cloned())),
            }
        }
    }
}

fn describe(orders: &[Order]) -> String {
    let names: Vec<String> = orders.iter().map(|o| o.to_string()).collect();
    format!("[{}]", names.join(", "))
}
