//! Benchmark utilities.

use rand::Rng;

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` records with sequential keys and random values.
pub fn generate_records(count: usize, value_size: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    (0..count)
        .map(|i| (format!("key_{i:08}").into_bytes(), random_data(value_size)))
        .collect()
}

/// Encode `records` as one frame stream.
pub fn frame_stream(records: &[(Vec<u8>, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    for (key, value) in records {
        out.extend_from_slice(&kvdump_codec::to_frame_bytes(key, value));
    }
    out
}
