mod error;
mod store;

pub use error::StoreError;
pub use store::{BatchedMutations, IterDirection, KvStore, prefix_upper_bound};

#[cfg(feature = "rocksdb")]
mod rocks;

#[cfg(feature = "rocksdb")]
pub use rocks::{RocksBatch, RocksStore};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::{MemoryBatch, MemoryStore};
