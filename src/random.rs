//! Random value generation, backed by the provider's cryptographic RNG.

use openssl::rand::rand_bytes;

use crate::error::Result;
use crate::provider;

/// Fill a buffer with random bytes.
///
/// # Errors
///
/// Errors if the provider RNG fails (entropy exhaustion, fork-safety
/// issues — all exceptional).
pub fn fill(buffer: &mut [u8]) -> Result<()> {
    provider::require();

    rand_bytes(buffer)?;
    Ok(())
}

/// Generate `size` random bytes.
///
/// # Errors
///
/// Errors if the provider RNG fails.
pub fn bytes(size: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; size];
    fill(&mut buffer)?;
    Ok(buffer)
}

/// Generate a random alphanumeric string of `length` characters.
///
/// # Errors
///
/// Errors if the provider RNG fails.
pub fn string(length: usize) -> Result<String> {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let random = bytes(length)?;
    Ok(random
        .iter()
        .map(|byte| ALPHABET[usize::from(*byte) % ALPHABET.len()] as char)
        .collect())
}
