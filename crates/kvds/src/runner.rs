use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam::channel::{Receiver, select};
use kvds_query::{Entry, Filter, Query, normalize_prefix};
use kvds_store::{IterDirection, KvStore};
use tracing::{debug, warn};

use crate::context::Context;
use crate::datastore::Inner;
use crate::error::DatastoreError;
use crate::results::{self, Producer, QueryResult, Results};

/// Start one worker thread that scans the store for `query` and streams the
/// matches into the returned [`Results`].
///
/// The worker is registered with the lifecycle before it is spawned and
/// deregistered when it exits, however it exits.
pub(crate) fn launch<S>(
    inner: &Arc<Inner<S>>,
    ctx: &Context,
    query: Query,
    direction: IterDirection,
) -> Result<Results, DatastoreError>
where
    S: KvStore + 'static,
{
    let token = inner.lifecycle.register()?;

    let capacity = inner.config.buffer_for(query.keys_only);
    let scan = Scan::new(&query, direction);
    let (results, producer) = results::channel(query, capacity);
    let outlet = Outlet {
        shutdown: token.shutdown.clone(),
        cancelled: ctx.cancelled().clone(),
        deadline: ctx.deadline_timer(),
        producer,
    };

    let inner = Arc::clone(inner);
    thread::Builder::new()
        .name("kvds-query".into())
        .spawn(move || {
            scan.run(&inner.store, &outlet);
            drop(outlet);
            drop(token);
        })
        .map_err(DatastoreError::Spawn)?;

    Ok(results)
}

/// Everything the worker needs from the query.
struct Scan {
    prefix: String,
    direction: IterDirection,
    filters: Vec<Filter>,
    limit: usize,
    offset: usize,
    keys_only: bool,
    return_sizes: bool,
}

impl Scan {
    fn new(query: &Query, direction: IterDirection) -> Self {
        Self {
            prefix: normalize_prefix(&query.prefix),
            direction,
            filters: query.filters.clone(),
            limit: query.limit,
            offset: query.offset,
            keys_only: query.keys_only,
            return_sizes: query.return_sizes,
        }
    }

    fn run<S: KvStore>(self, store: &S, outlet: &Outlet) {
        let Scan {
            prefix,
            direction,
            filters,
            limit,
            offset,
            keys_only,
            return_sizes,
        } = self;
        debug!(%prefix, ?direction, limit, offset, keys_only, "query scan started");

        let check_filters = !filters.is_empty();
        let mut skipped = 0usize;
        let mut sent = 0usize;
        let mut aborted = false;

        let mut admit = |entry: Entry| -> ControlFlow<()> {
            // Entries failing a filter do not count toward the offset.
            if check_filters && !filters.iter().all(|f| f.matches(&entry)) {
                return ControlFlow::Continue(());
            }
            skipped += 1;
            if skipped <= offset {
                return ControlFlow::Continue(());
            }
            if limit > 0 && sent >= limit {
                return ControlFlow::Break(());
            }
            if outlet.send(Ok(entry)).is_break() {
                aborted = true;
                return ControlFlow::Break(());
            }
            sent += 1;
            ControlFlow::Continue(())
        };

        // Keys come back exactly as stored; one that is not UTF-8 ends the stream.
        let mut invalid_key = None;
        let mut decode = |key: &[u8]| match std::str::from_utf8(key) {
            Ok(key) => Some(key.to_owned()),
            Err(source) => {
                invalid_key = Some(DatastoreError::InvalidKey {
                    key: key.to_vec(),
                    source,
                });
                None
            }
        };

        // Sizes need the value even when the caller only wants keys.
        let (op, outcome) = if keys_only && !return_sizes {
            let outcome = store.iterate_keys(prefix.as_bytes(), direction, |key| {
                let Some(key) = decode(key) else {
                    return ControlFlow::Break(());
                };
                admit(Entry::key_only(key))
            });
            ("IterateKeys", outcome)
        } else {
            let outcome = store.iterate(prefix.as_bytes(), direction, |key, value| {
                let Some(key) = decode(key) else {
                    return ControlFlow::Break(());
                };
                admit(Entry {
                    key,
                    value: (!keys_only).then(|| value.to_vec()),
                    size: return_sizes.then_some(value.len()),
                })
            });
            ("Iterate", outcome)
        };

        match outcome {
            Ok(()) if aborted => debug!(%prefix, sent, "query stream aborted"),
            Ok(()) => {
                if let Some(err) = invalid_key {
                    warn!(%prefix, error = %err, "query scan hit a non UTF-8 key");
                    let _ = outlet.send(Err(err));
                } else {
                    debug!(%prefix, sent, "query scan finished");
                }
            }
            Err(source) => {
                warn!(%prefix, op, error = %source, "query scan failed");
                let _ = outlet.send(Err(DatastoreError::Store { op, source }));
            }
        }
    }
}

/// Sending side of a query worker, raced against every cancellation source.
struct Outlet {
    producer: Producer,
    /// Datastore shutdown broadcast.
    shutdown: Receiver<()>,
    /// The query's own context.
    cancelled: Receiver<()>,
    deadline: Receiver<Instant>,
}

impl Outlet {
    /// Hand one result to the consumer.
    ///
    /// Blocks until the consumer has room or any cancellation source fires,
    /// whichever is ready first. On cancellation a final
    /// [`DatastoreError::Aborted`] is offered without blocking, since the
    /// consumer may have stopped reading, and the scan is told to stop.
    fn send(&self, result: QueryResult) -> ControlFlow<()> {
        select! {
            send(self.producer.out, result) -> res => {
                if res.is_ok() {
                    return ControlFlow::Continue(());
                }
            }
            recv(self.shutdown) -> _ => {}
            recv(self.cancelled) -> _ => {}
            recv(self.deadline) -> _ => {}
            recv(self.producer.cancel) -> _ => {}
        }

        let _ = self.producer.out.try_send(Err(DatastoreError::Aborted));
        ControlFlow::Break(())
    }
}
