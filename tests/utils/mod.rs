#![allow(dead_code)]

use rand::RngCore;

/// A pseudo-random payload for roundtrip tests.
pub fn payload(size: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; size];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}
