use std::sync::Arc;

use kvds_query::{Key, Query};
use kvds_store::KvStore;
use tracing::{debug, info, warn};

use crate::batch::Batch;
use crate::config::DatastoreConfig;
use crate::context::Context;
use crate::error::DatastoreError;
use crate::lifecycle::{Lifecycle, Status};
use crate::order::{self, Plan};
use crate::results::Results;
use crate::runner;

pub(crate) struct Inner<S> {
    pub(crate) store: S,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) config: DatastoreConfig,
}

/// Document-style datastore over an ordered key-value store.
///
/// Point operations translate directly to the store. Queries run on a
/// worker thread and stream their results; [`close`](Datastore::close)
/// stops and waits for every running query before flushing and closing the
/// store.
///
/// Cloning is cheap and every clone refers to the same store.
pub struct Datastore<S: KvStore> {
    inner: Arc<Inner<S>>,
}

impl<S: KvStore> Clone for Datastore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KvStore> Datastore<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, DatastoreConfig::default())
    }

    pub fn with_config(store: S, config: DatastoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                lifecycle: Lifecycle::new(),
                config,
            }),
        }
    }

    pub fn status(&self) -> Status {
        self.inner.lifecycle.status()
    }

    /// Fails with [`DatastoreError::NotFound`] when the key has no value.
    pub fn get(&self, ctx: &Context, key: &Key) -> Result<Vec<u8>, DatastoreError> {
        ctx.check()?;
        self.inner
            .store
            .get(key.as_bytes())
            .map_err(DatastoreError::store("Get"))?
            .ok_or(DatastoreError::NotFound)
    }

    pub fn has(&self, ctx: &Context, key: &Key) -> Result<bool, DatastoreError> {
        ctx.check()?;
        self.inner
            .store
            .has(key.as_bytes())
            .map_err(DatastoreError::store("Has"))
    }

    /// Size in bytes of the value stored under `key`.
    pub fn get_size(&self, ctx: &Context, key: &Key) -> Result<usize, DatastoreError> {
        self.get(ctx, key).map(|value| value.len())
    }

    pub fn put(&self, ctx: &Context, key: &Key, value: &[u8]) -> Result<(), DatastoreError> {
        ctx.check()?;
        self.inner
            .store
            .set(key.as_bytes(), value)
            .map_err(DatastoreError::store("Set"))
    }

    /// Deleting a missing key is not an error.
    pub fn delete(&self, ctx: &Context, key: &Key) -> Result<(), DatastoreError> {
        ctx.check()?;
        self.inner
            .store
            .delete(key.as_bytes())
            .map_err(DatastoreError::store("Delete"))
    }

    /// Make every write that returned before this call durable.
    ///
    /// The store flushes as a whole, so `prefix` only documents intent.
    pub fn sync(&self, ctx: &Context, _prefix: &Key) -> Result<(), DatastoreError> {
        ctx.check()?;
        self.inner
            .store
            .flush()
            .map_err(DatastoreError::store("Flush"))
    }

    pub fn batch(&self, ctx: &Context) -> Result<Batch<'_, S>, DatastoreError> {
        ctx.check()?;
        let inner = self
            .inner
            .store
            .batched()
            .map_err(DatastoreError::store("Batch"))?;
        Ok(Batch::new(inner))
    }

    /// Stop every running query, wait for them to exit, then flush and
    /// close the store.
    ///
    /// Safe to call repeatedly and concurrently: one caller does the work,
    /// the others wait for it and return `Ok(())`.
    pub fn close(&self) -> Result<(), DatastoreError> {
        self.inner.lifecycle.close(|| {
            info!("closing datastore");
            let store = &self.inner.store;
            let flushed = store.flush().map_err(DatastoreError::store("Flush"));
            let closed = store.close().map_err(DatastoreError::store("Close"));
            match (flushed, closed) {
                (Ok(()), Ok(())) => Ok(()),
                (Err(flush), Err(close)) => {
                    warn!(error = %close, "store close failed after flush failure");
                    Err(flush)
                }
                (Err(err), Ok(())) | (Ok(()), Err(err)) => Err(err),
            }
        })
    }
}

impl<S: KvStore + 'static> Datastore<S> {
    /// Start a query. Returns once the scan has been launched; results
    /// arrive through the returned stream.
    ///
    /// Errors found before scanning (expired context, conflicting key
    /// orders, closed datastore) are returned here. Errors found while
    /// scanning are the last item of the stream.
    pub fn query(&self, ctx: &Context, query: Query) -> Result<Results, DatastoreError> {
        ctx.check()?;
        if query.return_expirations {
            debug!("store has no TTL support, expirations will not be returned");
        }

        match order::resolve(&query.orders)? {
            Plan::Scan(direction) => {
                debug!(%query, ?direction, "starting query");
                runner::launch(&self.inner, ctx, query, direction)
            }
            Plan::Fallback(base_order) => self.query_naive(ctx, query, base_order),
        }
    }
}
