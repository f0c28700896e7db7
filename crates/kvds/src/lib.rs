mod batch;
mod config;
mod context;
mod datastore;
mod error;
mod fallback;
mod lifecycle;
mod order;
mod results;
mod runner;

pub use batch::Batch;
pub use config::DatastoreConfig;
pub use context::{CancelHandle, Context};
pub use datastore::Datastore;
pub use error::{ContextError, DatastoreError};
pub use lifecycle::Status;
pub use results::{QueryResult, Results};

pub use kvds_query::{Entry, Filter, Key, Op, Order, Query};
