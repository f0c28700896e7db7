use kvds_query::Key;
use kvds_store::{BatchedMutations, KvStore};

use crate::context::Context;
use crate::error::DatastoreError;

/// Mutations applied together on [`commit`](Batch::commit). A batch that is
/// dropped uncommitted has no effect.
pub struct Batch<'a, S: KvStore + 'a> {
    inner: S::Batch<'a>,
}

impl<'a, S: KvStore + 'a> Batch<'a, S> {
    pub(crate) fn new(inner: S::Batch<'a>) -> Self {
        Self { inner }
    }

    pub fn put(&mut self, ctx: &Context, key: &Key, value: &[u8]) -> Result<(), DatastoreError> {
        ctx.check()?;
        self.inner
            .set(key.as_bytes(), value)
            .map_err(DatastoreError::store("Set within batch"))
    }

    pub fn delete(&mut self, ctx: &Context, key: &Key) -> Result<(), DatastoreError> {
        ctx.check()?;
        self.inner
            .delete(key.as_bytes())
            .map_err(DatastoreError::store("Delete within batch"))
    }

    /// Apply every buffered mutation. On error nothing was committed.
    pub fn commit(self, ctx: &Context) -> Result<(), DatastoreError> {
        ctx.check()?;
        self.inner
            .commit()
            .map_err(DatastoreError::store("Commit within batch"))
    }
}
