//! Envelope encryption.
//!
//! Asymmetric keys cannot encrypt more than one modulus worth of bytes.
//! The envelope scheme handles arbitrary sizes by drawing a fresh
//! symmetric secret, wrapping *it* under the public key, and enciphering
//! the payload symmetrically.
//!
//! # Message Format
//!
//! ```text
//! [ wrapped secret length (4-byte LE) ]
//! [ wrapped secret        (exactly the key's size in bytes) ]
//! [ salted stream         (see the symmetric codec) ]
//! ```
//!
//! The wrapped secret's length is written explicitly so the reader does
//! not have to guess; the salted stream carries its own magic and salt.

use std::io::{self, Read, Write};

use openssl::pkey::{HasPrivate, HasPublic};
use openssl::rsa::RsaRef;
use secrecy::zeroize::Zeroizing;

use crate::algorithms::{self, Cipher, Mode, Oneway, Padding};
use crate::error::{Error, Result};
use crate::random;
use crate::raw;

/// Seal a stream of plain bytes under the public key.
///
/// # Errors
///
/// Errors if the wrap or the symmetric encipherment fails, or if
/// read/write fails.
pub fn seal<T: HasPublic>(
    key: &RsaRef<T>,
    padding: Padding,
    cipher: Cipher,
    mode: Mode,
    oneway: Oneway,
    plain: &mut dyn Read,
    code: &mut dyn Write,
) -> Result<()> {
    let symmetric = algorithms::resolve(cipher, mode)?;

    // A fresh secret, as long as the cipher's key.
    let secret = Zeroizing::new(random::bytes(symmetric.key_len())?);

    // Wrap the secret under the public key; the result is exactly one
    // modulus long.
    let wrapped = raw::asymmetric::encrypt(key, padding, &secret)?;

    let length = u32::try_from(wrapped.len())
        .map_err(|_| Error::Serialization("wrapped secret too large".to_string()))?;
    code.write_all(&length.to_le_bytes())
        .map_err(|e| Error::Io(e.to_string()))?;
    code.write_all(&wrapped)
        .map_err(|e| Error::Io(e.to_string()))?;

    // The rest of the output is the symmetric stream.
    raw::symmetric::encipher(&secret, symmetric, oneway.resolve()?, plain, code)
}

/// Open an envelope with the private key.
///
/// # Errors
///
/// Errors with [`Error::Decryption`] if the wrapped secret does not
/// match the key, and propagates the symmetric codec's errors for the
/// payload.
pub fn open<T: HasPrivate>(
    key: &RsaRef<T>,
    padding: Padding,
    cipher: Cipher,
    mode: Mode,
    oneway: Oneway,
    code: &mut dyn Read,
    plain: &mut dyn Write,
) -> Result<()> {
    let symmetric = algorithms::resolve(cipher, mode)?;

    let mut length = [0u8; 4];
    read_exact(code, &mut length)?;
    let length = u32::from_le_bytes(length) as usize;

    // The wrapped secret is exactly one modulus long; anything else
    // cannot have been produced for this key.
    if length != key.size() as usize {
        return Err(Error::Decryption);
    }

    let mut wrapped = vec![0u8; length];
    read_exact(code, &mut wrapped)?;

    let secret = Zeroizing::new(
        raw::asymmetric::decrypt(key, padding, &wrapped).map_err(|_| Error::Decryption)?,
    );

    raw::symmetric::decipher(&secret, symmetric, oneway.resolve()?, code, plain)
}

fn read_exact(reader: &mut dyn Read, buffer: &mut [u8]) -> Result<()> {
    match reader.read_exact(buffer) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(Error::Decryption),
        Err(err) => Err(Error::Io(err.to_string())),
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use openssl::rsa::Rsa;

    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let rsa = Rsa::generate(2048).unwrap();
        let plaintext = b"hello, world!";

        let mut sealed = Vec::new();
        seal(
            &rsa,
            Padding::Oaep,
            Cipher::Aes256,
            Mode::Cbc,
            Oneway::Sha256,
            &mut Cursor::new(plaintext),
            &mut sealed,
        )
        .unwrap();

        // 4-byte length + 256-byte wrapped secret + salted stream.
        assert!(sealed.len() > 4 + 256 + 16);
        assert_eq!(&sealed[..4], &256u32.to_le_bytes());
        assert_eq!(&sealed[4 + 256..4 + 256 + 8], b"Salted__");

        let mut opened = Vec::new();
        open(
            &rsa,
            Padding::Oaep,
            Cipher::Aes256,
            Mode::Cbc,
            Oneway::Sha256,
            &mut Cursor::new(sealed),
            &mut opened,
        )
        .unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn open_with_the_wrong_key_fails() {
        let rsa = Rsa::generate(2048).unwrap();
        let other = Rsa::generate(2048).unwrap();

        let mut sealed = Vec::new();
        seal(
            &rsa,
            Padding::Oaep,
            Cipher::Aes256,
            Mode::Cbc,
            Oneway::Sha256,
            &mut Cursor::new(b"hello, world!"),
            &mut sealed,
        )
        .unwrap();

        let err = open(
            &other,
            Padding::Oaep,
            Cipher::Aes256,
            Mode::Cbc,
            Oneway::Sha256,
            &mut Cursor::new(sealed),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert_eq!(err, Error::Decryption);
    }

    #[test]
    fn truncated_envelope_fails() {
        let rsa = Rsa::generate(2048).unwrap();

        let mut sealed = Vec::new();
        seal(
            &rsa,
            Padding::Oaep,
            Cipher::Aes256,
            Mode::Cbc,
            Oneway::Sha256,
            &mut Cursor::new(b"hello, world!"),
            &mut sealed,
        )
        .unwrap();
        sealed.truncate(100);

        assert!(
            open(
                &rsa,
                Padding::Oaep,
                Cipher::Aes256,
                Mode::Cbc,
                Oneway::Sha256,
                &mut Cursor::new(sealed),
                &mut Vec::new(),
            )
            .is_err()
        );
    }
}
