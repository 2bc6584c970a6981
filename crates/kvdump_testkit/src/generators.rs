//! Property-based test generators using proptest.

use crate::fixtures::RecordMap;
use proptest::prelude::*;

/// Bytes that carry meaning in the dump format. Payloads built from them
/// exercise binary safety harder than uniform random bytes do.
const STRUCTURAL_BYTES: &[u8] = b"+,:->\n\r\x00";

/// Strategy for a single payload byte, biased towards structural bytes.
pub fn payload_byte_strategy() -> impl Strategy<Value = u8> {
    prop_oneof![
        2 => prop::sample::select(STRUCTURAL_BYTES),
        3 => any::<u8>(),
    ]
}

/// Strategy for a key: 0 to 32 bytes.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(payload_byte_strategy(), 0..32)
}

/// Strategy for a value: 0 to 256 bytes.
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(payload_byte_strategy(), 0..256)
}

/// Strategy for a set of records with unique keys.
pub fn record_map_strategy(max_records: usize) -> impl Strategy<Value = RecordMap> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..max_records)
}

/// Strategy for two record sets whose keys do not overlap.
///
/// Every key of the first set starts with `0x00`, every key of the second
/// with `0x01`.
pub fn disjoint_record_maps_strategy(
    max_records: usize,
) -> impl Strategy<Value = (RecordMap, RecordMap)> {
    let prefixed = |prefix: u8| {
        record_map_strategy(max_records).prop_map(move |map| {
            map.into_iter()
                .map(|(mut key, value)| {
                    key.insert(0, prefix);
                    (key, value)
                })
                .collect::<RecordMap>()
        })
    };
    (prefixed(0x00), prefixed(0x01))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests, e.g. ones touching disk.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
