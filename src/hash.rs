//! Message digest computation.

use std::io::{Cursor, Read};

use crate::algorithms::Oneway;
use crate::error::{Error, Result};
use crate::raw;

/// Hash a plain text and return the digest.
///
/// # Errors
///
/// Errors if the oneway is not supported by this build.
pub fn hash(plain: &[u8], oneway: Oneway) -> Result<Vec<u8>> {
    hash_stream(&mut Cursor::new(plain), oneway)
}

/// Hash a stream of plain bytes.
///
/// # Errors
///
/// Errors if the oneway is not supported by this build, or the stream
/// breaks mid-read.
pub fn hash_stream(plain: &mut dyn Read, oneway: Oneway) -> Result<Vec<u8>> {
    raw::hash(oneway.resolve()?, plain)
}

/// Hash an arbitrary serializable value.
///
/// The value is serialized first, then its serialization is hashed. For
/// raw bytes, call [`hash`] — this function would hash their
/// *serialization*, not the bytes themselves.
///
/// # Errors
///
/// Errors if the value does not serialize, or the oneway is not
/// supported by this build.
pub fn hash_value<T: serde::Serialize>(value: &T, oneway: Oneway) -> Result<Vec<u8>> {
    let archive = serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
    hash(&archive, oneway)
}
