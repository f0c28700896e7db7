use std::ops::ControlFlow;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};

use rocksdb::{Direction, IteratorMode, MultiThreaded, OptimisticTransactionDB, Options};

use crate::error::StoreError;
use crate::store::{IterDirection, KvStore, prefix_upper_bound};

use super::batch::RocksBatch;

pub(crate) type Db = OptimisticTransactionDB<MultiThreaded>;

/// RocksDB-backed store. Closing drops the database handle; it waits for
/// readers holding the handle to finish.
pub struct RocksStore {
    db: RwLock<Option<Db>>,
}

impl RocksStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = Db::open(&opts, path).map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(Self {
            db: RwLock::new(Some(db)),
        })
    }

    fn handle(&self) -> Result<RwLockReadGuard<'_, Option<Db>>, StoreError> {
        let guard = self
            .db
            .read()
            .map_err(|e| StoreError::LockPoisoned(format!("db handle: {e}")))?;
        if guard.is_none() {
            return Err(StoreError::Closed);
        }
        Ok(guard)
    }

    pub(crate) fn with_db<T>(
        &self,
        f: impl FnOnce(&Db) -> Result<T, rocksdb::Error>,
    ) -> Result<T, StoreError> {
        let guard = self.handle()?;
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        f(db).map_err(|e| StoreError::Storage(e.to_string()))
    }

    fn scan<F>(&self, prefix: &[u8], direction: IterDirection, mut visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        let guard = self.handle()?;
        let db = guard.as_ref().ok_or(StoreError::Closed)?;
        let upper = prefix_upper_bound(prefix);

        let mode = match (direction, upper.as_deref()) {
            (IterDirection::Forward, _) => IteratorMode::From(prefix, Direction::Forward),
            (IterDirection::Backward, Some(upper)) => IteratorMode::From(upper, Direction::Reverse),
            (IterDirection::Backward, None) => IteratorMode::End,
        };

        for item in db.iterator(mode) {
            let (key, value) = item.map_err(|e| StoreError::Storage(e.to_string()))?;
            if let (IterDirection::Backward, Some(upper)) = (direction, upper.as_deref()) {
                // A reverse seek lands on the upper bound itself when it exists.
                if &*key >= upper {
                    continue;
                }
            }
            if !key.starts_with(prefix) {
                break;
            }
            if visit(&key[..], &value[..]).is_break() {
                break;
            }
        }
        Ok(())
    }
}

impl KvStore for RocksStore {
    type Batch<'a> = RocksBatch<'a>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.with_db(|db| db.get(key))
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.with_db(|db| db.get_pinned(key).map(|v| v.is_some()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.with_db(|db| db.put(key, value))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.with_db(|db| db.delete(key))
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.with_db(|db| db.flush())
    }

    fn close(&self) -> Result<(), StoreError> {
        let mut guard = self
            .db
            .write()
            .map_err(|e| StoreError::LockPoisoned(format!("db handle: {e}")))?;
        guard.take();
        Ok(())
    }

    fn iterate_keys<F>(
        &self,
        prefix: &[u8],
        direction: IterDirection,
        mut visit: F,
    ) -> Result<(), StoreError>
    where
        F: FnMut(&[u8]) -> ControlFlow<()>,
    {
        self.scan(prefix, direction, |key, _| visit(key))
    }

    fn iterate<F>(&self, prefix: &[u8], direction: IterDirection, visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        self.scan(prefix, direction, visit)
    }

    fn batched(&self) -> Result<Self::Batch<'_>, StoreError> {
        self.handle()?;
        Ok(RocksBatch::new(self))
    }
}
