use std::ops::{Bound, ControlFlow};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use imbl::OrdMap;

use crate::error::StoreError;
use crate::store::{IterDirection, KvStore, prefix_upper_bound};

use super::batch::MemoryBatch;

pub(crate) type Tree = OrdMap<Vec<u8>, Vec<u8>>;

/// In-memory ordered store.
///
/// Readers load an immutable snapshot of the tree, so a running scan never
/// observes writes that happen after it started. Writers serialize on a
/// mutex and publish a new tree; `imbl` structural sharing keeps the clone
/// cheap.
pub struct MemoryStore {
    data: ArcSwap<Tree>,
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: ArcSwap::new(Arc::new(OrdMap::new())),
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.data.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.load().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("write lock: {e}")))
    }

    /// Apply `mutate` to a private copy of the tree and publish it.
    pub(crate) fn write(&self, mutate: impl FnOnce(&mut Tree)) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        self.check_open()?;
        let mut tree = (**self.data.load()).clone();
        mutate(&mut tree);
        self.data.store(Arc::new(tree));
        Ok(())
    }

    /// Walk a snapshot of every pair under `prefix`.
    fn scan<F>(&self, prefix: &[u8], direction: IterDirection, mut visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        self.check_open()?;
        let snapshot = self.data.load_full();
        let upper = match prefix_upper_bound(prefix) {
            Some(upper) => Bound::Excluded(upper),
            None => Bound::Unbounded,
        };
        let range = snapshot.range((Bound::Included(prefix.to_vec()), upper));

        match direction {
            IterDirection::Forward => {
                for (key, value) in range {
                    if visit(key.as_slice(), value.as_slice()).is_break() {
                        break;
                    }
                }
            }
            IterDirection::Backward => {
                for (key, value) in range.rev() {
                    if visit(key.as_slice(), value.as_slice()).is_break() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for MemoryStore {
    type Batch<'a> = MemoryBatch<'a>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_open()?;
        Ok(self.data.load().get(key).cloned())
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.check_open()?;
        Ok(self.data.load().contains_key(key))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.write(|tree| {
            tree.insert(key.to_vec(), value.to_vec());
        })
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.write(|tree| {
            tree.remove(key);
        })
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.check_open()
    }

    fn close(&self) -> Result<(), StoreError> {
        // Wait out an in-progress write so it is not published after close.
        let _guard = self.lock_writes()?;
        self.closed.store(true, Ordering::Release);
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
        self.check_open()?;
        Ok(MemoryBatch::new(self))
    }
}
