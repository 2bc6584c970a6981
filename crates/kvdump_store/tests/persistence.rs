//! Reopen tests: whatever is written must come back in key order.

use kvdump_store::{Config, Store, StoreError};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn write_all(path: &std::path::Path, ops: &[(Vec<u8>, Vec<u8>)]) {
    let mut store = Store::open(path, Config::default()).unwrap();
    for (key, value) in ops {
        store.put(key, value).unwrap();
    }
    store.close().unwrap();
}

#[test]
fn thousand_entries_survive_reopen() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("store");

    let ops: Vec<_> = (0..1000)
        .rev()
        .map(|i| {
            (
                format!("key_{i:04}").into_bytes(),
                format!("value_{i:04}").into_bytes(),
            )
        })
        .collect();
    write_all(&path, &ops);

    let store = Store::open(&path, Config::new().error_if_missing(true)).unwrap();
    assert_eq!(store.len(), 1000);

    let keys: Vec<_> = store.iter().map(|r| r.unwrap().0).collect();
    assert_eq!(keys.first().unwrap(), b"key_0000");
    assert_eq!(keys.last().unwrap(), b"key_0999");
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn appending_garbage_is_detected_strictly_and_trimmed_leniently() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("store");
    write_all(&path, &[(b"a".to_vec(), b"1".to_vec())]);

    let log = path.join("data.log");
    let mut bytes = std::fs::read(&log).unwrap();
    let intact = bytes.len() as u64;
    bytes.extend_from_slice(b"\x40\x00\x00\x00junk");
    std::fs::write(&log, &bytes).unwrap();

    let strict = Store::open(&path, Config::default());
    assert!(matches!(strict, Err(StoreError::Corruption { .. })));

    let lenient = Store::open(&path, Config::new().strict(false)).unwrap();
    assert_eq!(lenient.get(b"a").unwrap(), Some(b"1".to_vec()));
    lenient.close().unwrap();

    assert_eq!(std::fs::metadata(&log).unwrap().len(), intact);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn reopen_matches_last_write_per_key(
        ops in prop::collection::vec(
            (prop::collection::vec(any::<u8>(), 0..8), prop::collection::vec(any::<u8>(), 0..64)),
            0..40,
        )
    ) {
        let temp = tempdir().unwrap();
        let path = temp.path().join("store");
        write_all(&path, &ops);

        let expected: BTreeMap<_, _> = ops.into_iter().collect();

        let store = Store::open(&path, Config::default()).unwrap();
        let actual: Vec<_> = store.iter().map(Result::unwrap).collect();
        prop_assert_eq!(actual, expected.into_iter().collect::<Vec<_>>());
    }
}
