mod batch;
mod store;

pub use batch::RocksBatch;
pub use store::RocksStore;
