//! Generic, stream-based PEM import/export.
//!
//! The core speaks `Read`/`Write`; mapping streams to filesystem paths
//! is the caller's business. Encrypted private keys use the standard
//! `Proc-Type: 4,ENCRYPTED` armoring; importing with the wrong
//! passphrase fails with [`Error::Decryption`], and a key exported with
//! a non-empty passphrase cannot be re-imported as only its public half.
//!
//! The per-algorithm modules (`rsa::pem`, `dsa::pem`) wrap these into
//! typed keys.

use std::io::{Read, Write};

use openssl::pkey::{HasPrivate, HasPublic, PKey, PKeyRef, Private, Public};
use openssl::symm;

use crate::algorithms::{Cipher, Mode};
use crate::error::{Error, Result};
use crate::provider;

pub mod defaults {
    use super::{Cipher, Mode};

    pub const PASSPHRASE: &str = "";
    pub const CIPHER: Cipher = Cipher::Aes256;
    pub const MODE: Mode = Mode::Cbc;
}

/// Import a public key from a PEM stream.
///
/// # Errors
///
/// Errors if the stream does not contain a readable public PEM — which
/// includes the case of an encrypted private PEM, whose public half is
/// not extractable without the passphrase.
pub fn import_public(pem: &mut dyn Read) -> Result<PKey<Public>> {
    provider::require();

    let bytes = read_all(pem)?;
    PKey::public_key_from_pem(&bytes)
        .map_err(|e| Error::InvalidKey(format!("not a readable public PEM: {e}")))
}

/// Import a private key from a PEM stream, decrypting it with the
/// passphrase.
///
/// # Errors
///
/// Errors with [`Error::Decryption`] on a wrong passphrase or an
/// unreadable PEM body.
pub fn import_private(pem: &mut dyn Read, passphrase: &str) -> Result<PKey<Private>> {
    provider::require();

    let bytes = read_all(pem)?;
    PKey::private_key_from_pem_passphrase(&bytes, passphrase.as_bytes())
        .map_err(|_| Error::Decryption)
}

/// Export a public key to a PEM stream.
///
/// # Errors
///
/// Errors if the encoding or the write fails.
pub fn export_public<T: HasPublic>(key: &PKeyRef<T>, pem: &mut dyn Write) -> Result<()> {
    provider::require();

    let bytes = key.public_key_to_pem()?;
    pem.write_all(&bytes).map_err(|e| Error::Io(e.to_string()))
}

/// Export a private key to a PEM stream, encrypting it with the
/// passphrase under the given cipher.
///
/// An empty passphrase exports the key in the clear.
///
/// # Errors
///
/// Errors if the cipher is unknown, or the encoding or write fails.
pub fn export_private<T: HasPrivate>(
    key: &PKeyRef<T>,
    pem: &mut dyn Write,
    passphrase: &str,
    cipher: Cipher,
    mode: Mode,
) -> Result<()> {
    provider::require();

    let bytes = if passphrase.is_empty() {
        key.private_key_to_pem_pkcs8()?
    } else {
        key.private_key_to_pem_pkcs8_passphrase(resolve(cipher, mode)?, passphrase.as_bytes())?
    };
    pem.write_all(&bytes).map_err(|e| Error::Io(e.to_string()))
}

pub(crate) fn resolve(cipher: Cipher, mode: Mode) -> Result<symm::Cipher> {
    crate::algorithms::resolve(cipher, mode)
}

pub(crate) fn read_all(reader: &mut dyn Read) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::Io(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use openssl::rsa::Rsa;

    use super::*;

    #[test]
    fn private_roundtrip_with_passphrase() {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut pem = Vec::new();
        export_private(&key, &mut pem, "Sancho", Cipher::Aes256, Mode::Cbc).unwrap();

        let imported = import_private(&mut Cursor::new(&pem), "Sancho").unwrap();
        assert!(key.public_eq(&imported));
    }

    #[test]
    fn wrong_passphrase_is_a_decryption_error() {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut pem = Vec::new();
        export_private(&key, &mut pem, "Sancho", Cipher::Aes256, Mode::Cbc).unwrap();

        let err = import_private(&mut Cursor::new(&pem), "Quixote").unwrap_err();
        assert_eq!(err, Error::Decryption);
    }

    #[test]
    fn public_import_of_an_encrypted_private_pem_fails() {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut pem = Vec::new();
        export_private(&key, &mut pem, "Sancho", Cipher::Aes256, Mode::Cbc).unwrap();

        assert!(import_public(&mut Cursor::new(&pem)).is_err());
    }

    #[test]
    fn public_roundtrip() {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut pem = Vec::new();
        export_public(&key, &mut pem).unwrap();
        assert!(pem.starts_with(b"-----BEGIN PUBLIC KEY-----"));

        let imported = import_public(&mut Cursor::new(&pem)).unwrap();
        assert!(key.public_eq(&imported));
    }
}
