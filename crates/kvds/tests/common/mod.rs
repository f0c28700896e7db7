#![allow(dead_code)]

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kvds::{Context, Datastore, DatastoreConfig, Entry, Key};
use kvds_store::{IterDirection, KvStore, MemoryBatch, MemoryStore, StoreError};

pub fn ctx() -> Context {
    Context::background()
}

pub fn memory_ds() -> Datastore<MemoryStore> {
    Datastore::new(MemoryStore::new())
}

/// Datastore whose result channels hold a single entry, so workers block
/// early and shutdown paths are exercised.
pub fn tight_ds<S: KvStore>(store: S) -> Datastore<S> {
    Datastore::with_config(
        store,
        DatastoreConfig {
            result_buffer: 1,
            keys_only_buffer: 1,
        },
    )
}

pub fn seed<S: KvStore>(ds: &Datastore<S>, pairs: &[(&str, &str)]) {
    let ctx = ctx();
    for (k, v) in pairs {
        ds.put(&ctx, &Key::new(k), v.as_bytes()).unwrap();
    }
}

/// `n` keys under `/n/` whose order by key is their insertion order.
pub fn seed_numbered<S: KvStore>(ds: &Datastore<S>, n: usize) {
    let ctx = ctx();
    for i in 0..n {
        let key = Key::new(format!("/n/{i:04}"));
        ds.put(&ctx, &key, format!("v{i}").as_bytes()).unwrap();
    }
}

pub fn keys(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.key.as_str()).collect()
}

/// Six records under `/users`, one sibling-prefix record and one elsewhere.
pub const USERS: &[(&str, &str)] = &[
    ("/users/alice", "c"),
    ("/users/bob", "a"),
    ("/users/carol", "d"),
    ("/users/dave", "b"),
    ("/users/erin", "a"),
    ("/users/frank", "e"),
    ("/usersx/zed", "z"),
    ("/groups/admins", "g"),
];

/// Failure switches and counters of a [`FailingStore`], shared with the
/// test after the store moves into a datastore.
#[derive(Default)]
pub struct Probe {
    pub fail_get: AtomicBool,
    pub fail_flush: AtomicBool,
    pub close_calls: AtomicUsize,
}

/// Memory store with switchable failures and a close counter.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    /// Iteration fails after visiting this many entries.
    pub fail_iterate_after: Option<usize>,
    pub probe: Arc<Probe>,
}

impl FailingStore {
    pub fn failing_iteration_after(n: usize) -> Self {
        Self {
            fail_iterate_after: Some(n),
            ..Default::default()
        }
    }

    pub fn probe(&self) -> Arc<Probe> {
        Arc::clone(&self.probe)
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Storage(format!("injected {what} failure"))
    }
}

impl KvStore for FailingStore {
    type Batch<'a> = MemoryBatch<'a>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if self.probe.fail_get.load(Ordering::SeqCst) {
            return Err(Self::injected("get"));
        }
        self.inner.get(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.inner.has(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.inner.delete(key)
    }

    fn flush(&self) -> Result<(), StoreError> {
        if self.probe.fail_flush.load(Ordering::SeqCst) {
            return Err(Self::injected("flush"));
        }
        self.inner.flush()
    }

    fn close(&self) -> Result<(), StoreError> {
        self.probe.close_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
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
        self.iterate(prefix, direction, |key, _| visit(key))
    }

    fn iterate<F>(
        &self,
        prefix: &[u8],
        direction: IterDirection,
        mut visit: F,
    ) -> Result<(), StoreError>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        let Some(limit) = self.fail_iterate_after else {
            return self.inner.iterate(prefix, direction, visit);
        };
        let mut visited = 0;
        let mut stopped = false;
        self.inner.iterate(prefix, direction, |key, value| {
            if visited == limit {
                return ControlFlow::Break(());
            }
            visited += 1;
            let flow = visit(key, value);
            stopped = flow.is_break();
            flow
        })?;
        if stopped {
            return Ok(());
        }
        Err(Self::injected("iterate"))
    }

    fn batched(&self) -> Result<Self::Batch<'_>, StoreError> {
        self.inner.batched()
    }
}
