use kvds_query::{Order, Query};
use kvds_store::KvStore;
use tracing::debug;

use crate::context::Context;
use crate::datastore::Datastore;
use crate::error::DatastoreError;
use crate::results::Results;

impl<S: KvStore + 'static> Datastore<S> {
    /// Serve a query whose order the store cannot scan in.
    ///
    /// Limit and offset only mean something after sorting, so the base scan
    /// fetches every match (filters still apply there) in `base_order`, and
    /// the rest of the query runs in memory.
    pub(crate) fn query_naive(
        &self,
        ctx: &Context,
        query: Query,
        base_order: Option<Order>,
    ) -> Result<Results, DatastoreError> {
        debug!(%query, base_order = ?base_order, "order not supported by store, sorting in memory");

        let base = Query {
            limit: 0,
            offset: 0,
            orders: base_order.into_iter().collect(),
            ..query.clone()
        };
        let results = self.query(ctx, base)?.replace_query(query.clone());

        // Prefix and filters were already applied by the base scan.
        let rest = Query {
            prefix: String::new(),
            filters: Vec::new(),
            ..query
        };
        Ok(results.apply_naive(&rest))
    }
}
