#![allow(dead_code)]

use std::ops::ControlFlow;

use kvds_store::{BatchedMutations, IterDirection, KvStore};

pub fn seed<S: KvStore>(store: &S, pairs: &[(&str, &str)]) {
    for (k, v) in pairs {
        store.set(k.as_bytes(), v.as_bytes()).unwrap();
    }
}

pub fn collect_keys<S: KvStore>(store: &S, prefix: &str, direction: IterDirection) -> Vec<String> {
    let mut keys = Vec::new();
    store
        .iterate_keys(prefix.as_bytes(), direction, |key| {
            keys.push(String::from_utf8(key.to_vec()).unwrap());
            ControlFlow::Continue(())
        })
        .unwrap();
    keys
}

pub fn collect_pairs<S: KvStore>(
    store: &S,
    prefix: &str,
    direction: IterDirection,
) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    store
        .iterate(prefix.as_bytes(), direction, |key, value| {
            pairs.push((
                String::from_utf8(key.to_vec()).unwrap(),
                String::from_utf8(value.to_vec()).unwrap(),
            ));
            ControlFlow::Continue(())
        })
        .unwrap();
    pairs
}

const FIXTURE: &[(&str, &str)] = &[
    ("/a/1", "one"),
    ("/a/2", "two"),
    ("/a/3", "three"),
    ("/ab/1", "other"),
    ("/b/1", "bee"),
];

pub fn check_point_ops<S: KvStore>(store: &S) {
    assert_eq!(store.get(b"/missing").unwrap(), None);
    assert!(!store.has(b"/missing").unwrap());

    store.set(b"/k", b"v1").unwrap();
    assert_eq!(store.get(b"/k").unwrap().as_deref(), Some(&b"v1"[..]));
    assert!(store.has(b"/k").unwrap());

    store.set(b"/k", b"v2").unwrap();
    assert_eq!(store.get(b"/k").unwrap().as_deref(), Some(&b"v2"[..]));

    store.delete(b"/k").unwrap();
    assert_eq!(store.get(b"/k").unwrap(), None);
    // deleting again is fine
    store.delete(b"/k").unwrap();
}

pub fn check_prefix_scans<S: KvStore>(store: &S) {
    seed(store, FIXTURE);

    assert_eq!(
        collect_keys(store, "/a/", IterDirection::Forward),
        vec!["/a/1", "/a/2", "/a/3"]
    );
    assert_eq!(
        collect_keys(store, "/a/", IterDirection::Backward),
        vec!["/a/3", "/a/2", "/a/1"]
    );
    assert_eq!(
        collect_pairs(store, "/a/", IterDirection::Forward),
        vec![
            ("/a/1".to_string(), "one".to_string()),
            ("/a/2".to_string(), "two".to_string()),
            ("/a/3".to_string(), "three".to_string()),
        ]
    );
    assert_eq!(collect_keys(store, "/", IterDirection::Forward).len(), FIXTURE.len());
    assert!(collect_keys(store, "/c/", IterDirection::Backward).is_empty());
}

pub fn check_scan_stops_on_break<S: KvStore>(store: &S) {
    seed(store, FIXTURE);

    let mut visited = Vec::new();
    store
        .iterate_keys(b"/", IterDirection::Forward, |key| {
            visited.push(key.to_vec());
            if visited.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
    assert_eq!(visited.len(), 2);
}

pub fn check_backward_scan_with_max_byte_prefix<S: KvStore>(store: &S) {
    store.set(&[b'x', 0xFF, 1], b"1").unwrap();
    store.set(&[b'x', 0xFF, 2], b"2").unwrap();
    store.set(&[b'y'], b"after").unwrap();

    let mut keys = Vec::new();
    store
        .iterate_keys(&[b'x', 0xFF], IterDirection::Backward, |key| {
            keys.push(key.to_vec());
            ControlFlow::Continue(())
        })
        .unwrap();
    assert_eq!(keys, vec![vec![b'x', 0xFF, 2], vec![b'x', 0xFF, 1]]);
}

pub fn check_batch<S: KvStore>(store: &S) {
    store.set(b"/k2", b"old").unwrap();

    let mut batch = store.batched().unwrap();
    batch.set(b"/k1", b"v1").unwrap();
    batch.delete(b"/k2").unwrap();
    // nothing visible before commit
    assert_eq!(store.get(b"/k1").unwrap(), None);
    assert!(store.has(b"/k2").unwrap());
    batch.commit().unwrap();

    assert_eq!(store.get(b"/k1").unwrap().as_deref(), Some(&b"v1"[..]));
    assert!(!store.has(b"/k2").unwrap());

    let mut dropped = store.batched().unwrap();
    dropped.set(b"/never", b"x").unwrap();
    drop(dropped);
    assert!(!store.has(b"/never").unwrap());
}

pub fn check_close<S: KvStore>(store: &S) {
    store.set(b"/k", b"v").unwrap();
    store.flush().unwrap();
    store.close().unwrap();

    assert!(store.get(b"/k").is_err());
    assert!(store.set(b"/k", b"v").is_err());
    assert!(
        store
            .iterate_keys(b"/", IterDirection::Forward, |_| ControlFlow::Continue(()))
            .is_err()
    );
}
