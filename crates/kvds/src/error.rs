use kvds_store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("datastore: key not found")]
    NotFound,

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("kvstore error during {op}: {source}")]
    Store {
        op: &'static str,
        #[source]
        source: StoreError,
    },

    /// A stored key is not valid UTF-8 and cannot be returned as a key string.
    #[error("stored key {key:?} is not valid UTF-8: {source}")]
    InvalidKey {
        key: Vec<u8>,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("incompatible orders passed: {0}")]
    IncompatibleOrders(String),

    /// A result stream was cancelled while it still had entries to send.
    #[error("close requested")]
    Aborted,

    #[error("datastore is closed")]
    Closed,

    #[error("failed to start query worker: {0}")]
    Spawn(#[source] std::io::Error),
}

impl DatastoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatastoreError::NotFound)
    }

    /// Wrap a store failure with the name of the operation that hit it.
    pub(crate) fn store(op: &'static str) -> impl FnOnce(StoreError) -> DatastoreError {
        move |source| DatastoreError::Store { op, source }
    }
}
