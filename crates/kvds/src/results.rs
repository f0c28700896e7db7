use crossbeam::channel::{self, Receiver, Sender};
use kvds_query::{Entry, Query, naive_query_apply};

use crate::error::DatastoreError;

pub type QueryResult = Result<Entry, DatastoreError>;

type Source = Box<dyn Iterator<Item = QueryResult> + Send>;

/// A lazily produced, single-pass stream of query results.
///
/// An `Err` item is always the last one. Dropping the stream, or calling
/// [`close`](Results::close), cancels the producer; `close` also waits until
/// it has stopped.
///
/// ```ignore
/// let results = ds.query(&ctx, Query::with_prefix("/users"))?;
/// for result in results {
///     let entry = result?;
///     println!("{}", entry.key);
/// }
/// ```
pub struct Results {
    query: Query,
    source: Source,
    /// Disconnects once the producing worker has exited.
    finished: Receiver<()>,
}

/// Producer half of a channel-backed [`Results`], owned by the scan worker.
pub(crate) struct Producer {
    pub(crate) out: Sender<QueryResult>,
    /// Disconnects when the consumer closes or drops the stream.
    pub(crate) cancel: Receiver<()>,
    _finished: Sender<()>,
}

/// Create a stream fed through a bounded channel of `capacity` items.
pub(crate) fn channel(query: Query, capacity: usize) -> (Results, Producer) {
    let (out, rx) = channel::bounded(capacity);
    let (cancel_tx, cancel) = channel::bounded(0);
    let (finished_tx, finished) = channel::bounded(0);

    let results = Results {
        query,
        source: Box::new(ChannelSource {
            rx,
            _cancel: cancel_tx,
            done: false,
        }),
        finished,
    };
    let producer = Producer {
        out,
        cancel,
        _finished: finished_tx,
    };
    (results, producer)
}

struct ChannelSource {
    rx: Receiver<QueryResult>,
    _cancel: Sender<()>,
    done: bool,
}

impl Iterator for ChannelSource {
    type Item = QueryResult;

    fn next(&mut self) -> Option<QueryResult> {
        if self.done {
            return None;
        }
        match self.rx.recv() {
            Ok(Ok(entry)) => Some(Ok(entry)),
            Ok(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            Err(_) => {
                self.done = true;
                None
            }
        }
    }
}

impl Results {
    /// The query these results answer.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Collect every remaining entry, stopping at the first error.
    pub fn rest(self) -> Result<Vec<Entry>, DatastoreError> {
        self.collect()
    }

    /// Stop the producer and wait for it to exit. Unread entries are
    /// discarded.
    pub fn close(self) {
        let Results {
            source, finished, ..
        } = self;
        drop(source);
        // Err once every producer-side handle is gone.
        let _ = finished.recv();
    }

    /// Report `query` as the query these results answer.
    pub(crate) fn replace_query(self, query: Query) -> Results {
        Results { query, ..self }
    }

    /// Run the in-memory query pipeline over this stream.
    pub(crate) fn apply_naive(self, naive: &Query) -> Results {
        let Results {
            query,
            source,
            finished,
        } = self;
        Results {
            query,
            source: Box::new(naive_query_apply(naive, source)),
            finished,
        }
    }
}

impl Iterator for Results {
    type Item = QueryResult;

    fn next(&mut self) -> Option<QueryResult> {
        self.source.next()
    }
}

impl std::fmt::Debug for Results {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Results")
            .field("query", &self.query.to_string())
            .finish_non_exhaustive()
    }
}
