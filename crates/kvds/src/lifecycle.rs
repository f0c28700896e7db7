use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use arc_swap::ArcSwapOption;
use crossbeam::channel::{self, Receiver, Sender};
use tracing::debug;

use crate::error::DatastoreError;

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Closing,
    Closed,
}

/// Held while the datastore accepts new query workers.
///
/// Both senders only ever disconnect: dropping the gate broadcasts shutdown
/// to every worker, and the root work sender is the last one `close` waits
/// for.
struct Gate {
    _shutdown: Sender<()>,
    work: Sender<()>,
}

/// Registration of one query worker. Dropping it deregisters the worker.
pub(crate) struct WorkToken {
    _work: Sender<()>,
    /// Disconnects when the datastore starts closing.
    pub(crate) shutdown: Receiver<()>,
}

/// Tracks outstanding query workers and sequences shutdown.
///
/// Queries only touch the atomic gate; no lock is shared between a query
/// and `close`.
pub(crate) struct Lifecycle {
    status: AtomicU8,
    gate: ArcSwapOption<Gate>,
    shutdown: Receiver<()>,
    drained: Receiver<()>,
    closed_latch: ArcSwapOption<Sender<()>>,
    closed: Receiver<()>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        let (shutdown_tx, shutdown) = channel::bounded(0);
        let (work, drained) = channel::bounded(0);
        let (latch, closed) = channel::bounded(0);
        Self {
            status: AtomicU8::new(OPEN),
            gate: ArcSwapOption::from_pointee(Gate {
                _shutdown: shutdown_tx,
                work,
            }),
            shutdown,
            drained,
            closed_latch: ArcSwapOption::from_pointee(latch),
            closed,
        }
    }

    pub(crate) fn status(&self) -> Status {
        match self.status.load(Ordering::Acquire) {
            OPEN => Status::Open,
            CLOSING => Status::Closing,
            _ => Status::Closed,
        }
    }

    /// Register a worker. Must happen before the worker is started so that
    /// `close` can never observe zero outstanding work while one is about to
    /// run.
    pub(crate) fn register(&self) -> Result<WorkToken, DatastoreError> {
        let gate: Arc<Gate> = self.gate.load_full().ok_or(DatastoreError::Closed)?;
        Ok(WorkToken {
            _work: gate.work.clone(),
            shutdown: self.shutdown.clone(),
        })
    }

    /// Shut down exactly once.
    ///
    /// The first caller stops accepting workers, signals the running ones,
    /// waits for all of them to exit and then runs `release`. Every other
    /// caller blocks until that has finished and returns `Ok(())`.
    pub(crate) fn close<F>(&self, release: F) -> Result<(), DatastoreError>
    where
        F: FnOnce() -> Result<(), DatastoreError>,
    {
        if self
            .status
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("close already in progress, waiting");
            let _ = self.closed.recv();
            return Ok(());
        }

        debug!("closing: signalling query workers");
        self.gate.store(None);
        let _ = self.drained.recv();

        debug!("closing: all query workers exited");
        let result = release();

        self.status.store(CLOSED, Ordering::Release);
        self.closed_latch.store(None);
        result
    }
}
