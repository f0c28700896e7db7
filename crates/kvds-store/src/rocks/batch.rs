use crate::error::StoreError;
use crate::store::BatchedMutations;

use super::store::RocksStore;

enum Mutation {
    Set(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Buffered mutations against a [`RocksStore`], applied in one optimistic
/// transaction on commit.
pub struct RocksBatch<'a> {
    store: &'a RocksStore,
    ops: Vec<Mutation>,
}

impl<'a> RocksBatch<'a> {
    pub(crate) fn new(store: &'a RocksStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }
}

impl BatchedMutations for RocksBatch<'_> {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.ops.push(Mutation::Set(key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.ops.push(Mutation::Delete(key.to_vec()));
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        if self.ops.is_empty() {
            return Ok(());
        }
        let ops = self.ops;
        self.store.with_db(|db| {
            let txn = db.transaction();
            for op in &ops {
                match op {
                    Mutation::Set(key, value) => txn.put(key, value)?,
                    Mutation::Delete(key) => txn.delete(key)?,
                }
            }
            txn.commit()
        })
    }
}
