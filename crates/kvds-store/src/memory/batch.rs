use crate::error::StoreError;
use crate::store::BatchedMutations;

use super::store::MemoryStore;

enum Mutation {
    Set(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Buffered mutations against a [`MemoryStore`], published as one tree swap.
pub struct MemoryBatch<'a> {
    store: &'a MemoryStore,
    ops: Vec<Mutation>,
}

impl<'a> MemoryBatch<'a> {
    pub(crate) fn new(store: &'a MemoryStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }
}

impl BatchedMutations for MemoryBatch<'_> {
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
        self.store.write(|tree| {
            for op in ops {
                match op {
                    Mutation::Set(key, value) => {
                        tree.insert(key, value);
                    }
                    Mutation::Delete(key) => {
                        tree.remove(&key);
                    }
                }
            }
        })
    }
}
