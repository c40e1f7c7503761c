//! Stateless streaming primitives over the provider.
//!
//! Everything here consumes input from a byte slice or a `Read` stream
//! and produces output as a fresh buffer or into a `Write` stream, in
//! chunks of [`STREAM_BLOCK_SIZE`]. Callers hand over *resolved* provider
//! handles ([`openssl::hash::MessageDigest`], [`openssl::symm::Cipher`]);
//! the high-level modules do the catalog lookups.
//!
//! Every operation is a three-step machine: initialize a context, update
//! it once per block read, finalize. Contexts are scope-bound provider
//! wrappers, so they are released on every exit path.

use std::io::{self, Read};

use openssl::hash::{Hasher, MessageDigest};

use crate::error::{Error, Result};
use crate::provider;

pub mod asymmetric;
pub mod hmac;
pub mod symmetric;

/// The size of the chunk to process iteratively from the streams.
pub const STREAM_BLOCK_SIZE: usize = 524_288;

/// Hash a stream of plain bytes.
///
/// The digest has the oneway's natural output length.
///
/// # Errors
///
/// Errors if the digest context fails or the input stream breaks
/// mid-read.
pub fn hash(oneway: MessageDigest, plain: &mut dyn Read) -> Result<Vec<u8>> {
    provider::require();

    let mut context = Hasher::new(oneway)?;

    let mut input = vec![0u8; STREAM_BLOCK_SIZE];
    loop {
        let read = read_block(plain, &mut input)?;
        if read == 0 {
            break;
        }
        context.update(&input[..read])?;
    }

    let digest = context.finish()?;

    Ok(digest.to_vec())
}

/// Read up to one block from the stream.
///
/// `Ok(0)` is EOF. Interrupted reads are retried; any other read failure
/// is an [`Error::Io`].
pub(crate) fn read_block(reader: &mut dyn Read, buffer: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buffer) {
            Ok(read) => return Ok(read),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(Error::Io(err.to_string())),
        }
    }
}
