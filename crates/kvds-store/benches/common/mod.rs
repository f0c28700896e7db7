#![allow(dead_code)]

use kvds_store::{BatchedMutations, KvStore};

/// Generate `n` pairs shaped like datastore keys with ~200 byte values.
pub fn generate_kv_pairs(n: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    (0..n)
        .map(|i| {
            let key = format!("/bench/rec-{i:08}").into_bytes();
            let value = format!(
                "{{\"id\":\"rec-{i}\",\"status\":\"{}\",\"padding\":\"{}\"}}",
                if i % 2 == 0 { "active" } else { "rejected" },
                "x".repeat(160),
            )
            .into_bytes();
            (key, value)
        })
        .collect()
}

/// Seed a store with `n` pairs in one committed batch.
pub fn seed_store<S: KvStore>(store: &S, n: usize) {
    let mut batch = store.batched().unwrap();
    for (k, v) in generate_kv_pairs(n) {
        batch.set(&k, &v).unwrap();
    }
    batch.commit().unwrap();
}
