//! Keyed message authentication.
//!
//! Keys are arbitrary byte strings, turned into provider MAC keys under
//! the hood. Verification is constant-time with respect to the digest
//! bytes.

use std::io::{Cursor, Read};

use openssl::pkey::PKey;

use crate::algorithms::Oneway;
use crate::error::{Error, Result};
use crate::raw;

/// HMAC-sign a plain text with the given key.
///
/// # Errors
///
/// Errors if the oneway is not supported by this build, or the MAC key
/// cannot be built.
pub fn sign(plain: &[u8], key: &[u8], oneway: Oneway) -> Result<Vec<u8>> {
    sign_stream(&mut Cursor::new(plain), key, oneway)
}

/// HMAC-sign a stream of plain bytes.
///
/// # Errors
///
/// Errors if the oneway is not supported by this build, the MAC key
/// cannot be built, or the stream breaks mid-read.
pub fn sign_stream(plain: &mut dyn Read, key: &[u8], oneway: Oneway) -> Result<Vec<u8>> {
    let key = PKey::hmac(key)?;
    raw::hmac::sign(&key, oneway.resolve()?, plain)
}

/// Whether the digest matches the plain text under the key.
///
/// # Errors
///
/// Errors if the oneway is not supported by this build; a mismatching
/// digest is `Ok(false)`.
pub fn verify(digest: &[u8], plain: &[u8], key: &[u8], oneway: Oneway) -> Result<bool> {
    verify_stream(digest, &mut Cursor::new(plain), key, oneway)
}

/// Whether the digest matches the stream of plain bytes under the key.
///
/// # Errors
///
/// Errors if the oneway is not supported by this build, or the stream
/// breaks mid-read; a mismatching digest is `Ok(false)`.
pub fn verify_stream(
    digest: &[u8],
    plain: &mut dyn Read,
    key: &[u8],
    oneway: Oneway,
) -> Result<bool> {
    let key = PKey::hmac(key)?;
    raw::hmac::verify(&key, oneway.resolve()?, digest, plain)
}

/// HMAC-sign an arbitrary serializable value.
///
/// The value is serialized first, then its serialization is signed. For
/// raw bytes, call [`sign`].
///
/// # Errors
///
/// Errors if the value does not serialize, or the oneway is not
/// supported by this build.
pub fn sign_value<T: serde::Serialize>(value: &T, key: &[u8], oneway: Oneway) -> Result<Vec<u8>> {
    let archive = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
    sign(&archive, key, oneway)
}

/// Whether the digest matches the serializable value under the key.
///
/// # Errors
///
/// Errors if the value does not serialize, or the oneway is not
/// supported by this build; a mismatching digest is `Ok(false)`.
pub fn verify_value<T: serde::Serialize>(
    digest: &[u8],
    value: &T,
    key: &[u8],
    oneway: Oneway,
) -> Result<bool> {
    let archive = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
    verify(digest, &archive, key, oneway)
}
