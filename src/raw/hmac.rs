//! Streaming HMAC over provider MAC keys.

use std::io::Read;

use openssl::hash::MessageDigest;
use openssl::memcmp;
use openssl::pkey::{HasPrivate, PKeyRef};
use openssl::sign::Signer;

use crate::error::Result;
use crate::provider;
use crate::raw::{STREAM_BLOCK_SIZE, read_block};

/// HMAC-sign a stream of plain bytes with the given MAC key.
///
/// # Errors
///
/// Errors if the digest context fails or the input stream breaks
/// mid-read.
pub fn sign<T: HasPrivate>(
    key: &PKeyRef<T>,
    oneway: MessageDigest,
    plain: &mut dyn Read,
) -> Result<Vec<u8>> {
    provider::require();

    let mut context = Signer::new(oneway, key)?;

    let mut input = vec![0u8; STREAM_BLOCK_SIZE];
    loop {
        let read = read_block(plain, &mut input)?;
        if read == 0 {
            break;
        }
        context.update(&input[..read])?;
    }

    let digest = context.sign_to_vec()?;

    Ok(digest)
}

/// Whether the digest matches the stream of plain bytes under the key.
///
/// The comparison is constant-time with respect to the digest bytes.
///
/// # Errors
///
/// Errors if the digest context fails or the input stream breaks
/// mid-read; a mismatching digest is `Ok(false)`.
pub fn verify<T: HasPrivate>(
    key: &PKeyRef<T>,
    oneway: MessageDigest,
    digest: &[u8],
    plain: &mut dyn Read,
) -> Result<bool> {
    let expected = sign(key, oneway, plain)?;

    if digest.len() != expected.len() {
        return Ok(false);
    }

    Ok(memcmp::eq(digest, &expected))
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use openssl::pkey::PKey;

    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let key = PKey::hmac(b"don't tell anyone").unwrap();

        let digest = sign(
            &key,
            MessageDigest::sha256(),
            &mut Cursor::new(b"hello, world!"),
        )
        .unwrap();
        assert_eq!(digest.len(), 32);

        let ok = verify(
            &key,
            MessageDigest::sha256(),
            &digest,
            &mut Cursor::new(b"hello, world!"),
        )
        .unwrap();
        assert!(ok);
    }

    #[test]
    fn tampered_digest_verifies_false() {
        let key = PKey::hmac(b"don't tell anyone").unwrap();

        let mut digest = sign(
            &key,
            MessageDigest::sha256(),
            &mut Cursor::new(b"hello, world!"),
        )
        .unwrap();
        digest[0] ^= 0x01;

        let ok = verify(
            &key,
            MessageDigest::sha256(),
            &digest,
            &mut Cursor::new(b"hello, world!"),
        )
        .unwrap();
        assert!(!ok);
    }

    #[test]
    fn truncated_digest_verifies_false() {
        let key = PKey::hmac(b"don't tell anyone").unwrap();

        let digest = sign(
            &key,
            MessageDigest::sha256(),
            &mut Cursor::new(b"hello, world!"),
        )
        .unwrap();

        let ok = verify(
            &key,
            MessageDigest::sha256(),
            &digest[..16],
            &mut Cursor::new(b"hello, world!"),
        )
        .unwrap();
        assert!(!ok);
    }
}
