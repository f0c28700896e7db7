use std::ops::ControlFlow;

use crate::error::StoreError;

/// Key order of a prefix scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterDirection {
    Forward,
    Backward,
}

/// An ordered byte key-value engine.
///
/// All methods take `&self`; implementations are shared across threads and
/// handle their own synchronization. Once [`close`](KvStore::close) has
/// returned, every other method fails with [`StoreError::Closed`].
pub trait KvStore: Send + Sync {
    type Batch<'a>: BatchedMutations
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn has(&self, key: &[u8]) -> Result<bool, StoreError>;
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// Persist everything written so far.
    fn flush(&self) -> Result<(), StoreError>;
    fn close(&self) -> Result<(), StoreError>;

    /// Visit every key starting with `prefix` in `direction` order.
    ///
    /// Returning [`ControlFlow::Break`] from `visit` stops the scan; the
    /// call then returns `Ok(())`.
    fn iterate_keys<F>(
        &self,
        prefix: &[u8],
        direction: IterDirection,
        visit: F,
    ) -> Result<(), StoreError>
    where
        F: FnMut(&[u8]) -> ControlFlow<()>;

    /// Like [`iterate_keys`](KvStore::iterate_keys), visiting values too.
    fn iterate<F>(&self, prefix: &[u8], direction: IterDirection, visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>;

    fn batched(&self) -> Result<Self::Batch<'_>, StoreError>;
}

/// Mutations buffered until [`commit`](BatchedMutations::commit).
///
/// Dropping a batch without committing discards it.
pub trait BatchedMutations {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;
    /// Apply all buffered mutations atomically.
    fn commit(self) -> Result<(), StoreError>;
}

/// Smallest key greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix, or all bytes `0xFF`),
/// meaning the range is unbounded above.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_increments_last_byte() {
        assert_eq!(prefix_upper_bound(b"/a/"), Some(b"/a0".to_vec()));
    }

    #[test]
    fn upper_bound_carries_over_max_bytes() {
        assert_eq!(prefix_upper_bound(&[b'a', 0xFF, 0xFF]), Some(vec![b'b']));
    }

    #[test]
    fn upper_bound_unbounded() {
        assert_eq!(prefix_upper_bound(b""), None);
        assert_eq!(prefix_upper_bound(&[0xFF, 0xFF]), None);
    }
}
