use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use crate::error::ContextError;

/// Cancellation scope and optional deadline for an operation.
///
/// Every public datastore operation checks its context before touching the
/// store. A running query also watches it while waiting to hand an entry to
/// the consumer.
///
/// Cancellation is a channel that never carries a message: once the
/// [`CancelHandle`] is gone the channel disconnects, which every clone of the
/// context observes at once.
#[derive(Debug, Clone)]
pub struct Context {
    cancelled: Receiver<()>,
    deadline: Option<Instant>,
}

/// Cancels its [`Context`] (and every context derived from it) when
/// [`cancel`](CancelHandle::cancel) is called or the handle is dropped.
#[derive(Debug)]
pub struct CancelHandle {
    _tx: Sender<()>,
}

impl CancelHandle {
    pub fn cancel(self) {}
}

impl Context {
    /// Never cancelled, no deadline.
    pub fn background() -> Self {
        Self {
            cancelled: channel::never(),
            deadline: None,
        }
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = channel::bounded(0);
        let ctx = Self {
            cancelled: rx,
            deadline: None,
        };
        (ctx, CancelHandle { _tx: tx })
    }

    /// Derive a context that also expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that also expires at `deadline`. The earlier of the
    /// two deadlines wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            cancelled: self.cancelled.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if let Err(TryRecvError::Disconnected) = self.cancelled.try_recv() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Disconnects when the context is cancelled.
    pub(crate) fn cancelled(&self) -> &Receiver<()> {
        &self.cancelled
    }

    /// Fires once the deadline passes; never fires without one.
    pub(crate) fn deadline_timer(&self) -> Receiver<Instant> {
        match self.deadline {
            Some(deadline) => channel::at(deadline),
            None => channel::never(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
