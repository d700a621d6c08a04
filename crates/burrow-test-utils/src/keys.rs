//! Seeded key generators.
//!
//! Every generator takes an explicit seed and uses ChaCha8, so a failing
//! test reproduces exactly on every platform.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A ChaCha8 RNG seeded from `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `n` distinct random `i64` keys, in generation order.
pub fn distinct_keys(n: usize, seed: u64) -> Vec<i64> {
    let mut rng = seeded_rng(seed);
    let mut seen = HashSet::with_capacity(n);
    let mut keys = Vec::with_capacity(n);
    while keys.len() < n {
        let key: i64 = rng.gen();
        if seen.insert(key) {
            keys.push(key);
        }
    }
    keys
}

/// `n` distinct keys that all hash to `bucket` in a table of `capacity`
/// slots (`capacity` must be a power of two).
///
/// Useful for building long probe chains on purpose.
pub fn colliding_keys(n: usize, bucket: usize, capacity: usize) -> Vec<i64> {
    assert!(capacity.is_power_of_two(), "capacity must be a power of two");
    assert!(bucket < capacity, "bucket must be below capacity");
    (0..n as i64)
        .map(|i| bucket as i64 + i * capacity as i64)
        .collect()
}

/// A seeded permutation of `keys`.
pub fn shuffled(keys: &[i64], seed: u64) -> Vec<i64> {
    let mut out = keys.to_vec();
    out.shuffle(&mut seeded_rng(seed));
    out
}
