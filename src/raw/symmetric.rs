//! Salted symmetric stream codec.
//!
//! Wire-compatible with `openssl enc -salted`:
//!
//! ```text
//! [ "Salted__"   (8 bytes, ASCII) ]
//! [ salt         (8 bytes, random) ]
//! [ ciphertext   (variable, block-padded) ]
//! ```
//!
//! The key and IV are not the secret itself: they are derived from
//! `(cipher, oneway, salt, secret)` with a single EVP_BytesToKey
//! iteration, which is what makes the output interoperable with the
//! `openssl` command line.

use std::io::{self, Read, Write};

use openssl::hash::MessageDigest;
use openssl::pkcs5::bytes_to_key;
use openssl::symm::{self, Crypter};
use secrecy::zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::provider;
use crate::random;
use crate::raw::{STREAM_BLOCK_SIZE, read_block};

/// Embedded in every encrypted text so the decryption process knows the
/// text has been salted.
const MAGIC: &[u8; 8] = b"Salted__";

const SALT_LENGTH: usize = 8;

/// The provider's EVP_MAX_KEY_LENGTH; a derivation requesting more is
/// refused.
const MAXIMUM_KEY_LENGTH: usize = 64;

/// Derive a key/IV pair from the salt and the secret.
fn derive(
    cipher: symm::Cipher,
    oneway: MessageDigest,
    salt: &[u8],
    secret: &[u8],
) -> Result<(Zeroizing<Vec<u8>>, Option<Zeroizing<Vec<u8>>>)> {
    if cipher.key_len() > MAXIMUM_KEY_LENGTH {
        return Err(Error::KeyTooLarge);
    }

    // One iteration, like `openssl enc`.
    let pair = bytes_to_key(cipher, oneway, secret, Some(salt), 1)?;

    Ok((Zeroizing::new(pair.key), pair.iv.map(Zeroizing::new)))
}

/// Encipher a stream of plain bytes into a salted stream.
///
/// # Errors
///
/// Errors if the key derivation or the cipher context fails, or if
/// read/write fails.
pub fn encipher(
    secret: &[u8],
    cipher: symm::Cipher,
    oneway: MessageDigest,
    plain: &mut dyn Read,
    code: &mut dyn Write,
) -> Result<()> {
    provider::require();

    let mut salt = [0u8; SALT_LENGTH];
    random::fill(&mut salt)?;

    let (key, iv) = derive(cipher, oneway, &salt, secret)?;

    let mut context = Crypter::new(
        cipher,
        symm::Mode::Encrypt,
        &key,
        iv.as_deref().map(|iv| &iv[..]),
    )?;

    // Embed the magic and salt directly into the output code.
    code.write_all(MAGIC)
        .map_err(|e| Error::Io(e.to_string()))?;
    code.write_all(&salt)
        .map_err(|e| Error::Io(e.to_string()))?;

    // The cipher may produce up to one extra block per update call.
    let block_size = cipher.block_size();

    let mut input = vec![0u8; STREAM_BLOCK_SIZE];
    let mut output = vec![0u8; STREAM_BLOCK_SIZE + block_size];

    loop {
        let read = read_block(plain, &mut input)?;
        if read == 0 {
            break;
        }

        let written = context.update(&input[..read], &mut output)?;
        code.write_all(&output[..written])
            .map_err(|e| Error::Io(e.to_string()))?;
    }

    // Emit the final, padded block.
    let written = context.finalize(&mut output)?;
    code.write_all(&output[..written])
        .map_err(|e| Error::Io(e.to_string()))?;

    Ok(())
}

/// Decipher a salted stream back into plain bytes.
///
/// # Errors
///
/// Errors with [`Error::MissingSalt`] if the stream does not start with
/// the salted magic, and with [`Error::Decryption`] if the ciphertext
/// does not decrypt under the derived key (wrong secret, mangled tail).
pub fn decipher(
    secret: &[u8],
    cipher: symm::Cipher,
    oneway: MessageDigest,
    code: &mut dyn Read,
    plain: &mut dyn Write,
) -> Result<()> {
    provider::require();

    // Check whether the code was produced with a salt.
    let mut magic = [0u8; MAGIC.len()];
    read_header(code, &mut magic)?;
    if &magic != MAGIC {
        return Err(Error::MissingSalt);
    }

    let mut salt = [0u8; SALT_LENGTH];
    read_header(code, &mut salt)?;

    let (key, iv) = derive(cipher, oneway, &salt, secret)?;

    let mut context = Crypter::new(
        cipher,
        symm::Mode::Decrypt,
        &key,
        iv.as_deref().map(|iv| &iv[..]),
    )?;

    let block_size = cipher.block_size();

    let mut input = vec![0u8; STREAM_BLOCK_SIZE];
    let mut output = vec![0u8; STREAM_BLOCK_SIZE + block_size];

    loop {
        let read = read_block(code, &mut input)?;
        if read == 0 {
            break;
        }

        let written = context
            .update(&input[..read], &mut output)
            .map_err(|_| Error::Decryption)?;
        plain
            .write_all(&output[..written])
            .map_err(|e| Error::Io(e.to_string()))?;
    }

    // The final block carries the padding check: a wrong secret fails
    // here, not earlier.
    let written = context.finalize(&mut output).map_err(|_| Error::Decryption)?;
    plain
        .write_all(&output[..written])
        .map_err(|e| Error::Io(e.to_string()))?;

    Ok(())
}

/// Read an exact-size header field; a short read means the salted
/// prologue is absent or corrupt.
fn read_header(reader: &mut dyn Read, buffer: &mut [u8]) -> Result<()> {
    match reader.read_exact(buffer) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(Error::MissingSalt),
        Err(err) => Err(Error::Io(err.to_string())),
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use super::*;

    fn aes256() -> symm::Cipher {
        crate::algorithms::resolve(crate::algorithms::Cipher::Aes256, crate::algorithms::Mode::Cbc)
            .unwrap()
    }

    #[test]
    fn encipher_decipher_roundtrip() {
        let secret = b"don't tell anyone";
        let plaintext = b"hello, world!";

        let mut encrypted = Vec::new();
        encipher(
            secret,
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(plaintext),
            &mut encrypted,
        )
        .unwrap();

        let mut decrypted = Vec::new();
        decipher(
            secret,
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(encrypted),
            &mut decrypted,
        )
        .unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn encipher_output_is_salted() {
        let mut encrypted = Vec::new();
        encipher(
            b"secret",
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(b"hello, world!"),
            &mut encrypted,
        )
        .unwrap();

        assert_eq!(&encrypted[..8], b"Salted__");
    }

    #[test]
    fn decipher_without_magic_is_missing_salt() {
        let err = decipher(
            b"secret",
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(b"NotSalted_at_all"),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert_eq!(err, Error::MissingSalt);
    }

    #[test]
    fn decipher_of_truncated_header_is_missing_salt() {
        let err = decipher(
            b"secret",
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(b"Salt"),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert_eq!(err, Error::MissingSalt);
    }

    #[test]
    fn decipher_with_wrong_secret_does_not_yield_the_plaintext() {
        let mut encrypted = Vec::new();
        encipher(
            b"right secret",
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(b"hello, world!"),
            &mut encrypted,
        )
        .unwrap();

        // A wrong secret fails the final padding check virtually always;
        // in the rare case the garbage tail happens to be well-padded, the
        // output still isn't the plaintext.
        let mut decrypted = Vec::new();
        match decipher(
            b"wrong secret",
            aes256(),
            MessageDigest::sha256(),
            &mut Cursor::new(encrypted),
            &mut decrypted,
        ) {
            Err(err) => assert_eq!(err, Error::Decryption),
            Ok(()) => assert_ne!(decrypted, b"hello, world!"),
        }
    }
}
