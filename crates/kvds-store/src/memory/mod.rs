mod batch;
mod store;

pub use batch::MemoryBatch;
pub use store::MemoryStore;
