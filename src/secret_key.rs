//! Symmetric secret keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read, Write};

use secrecy::zeroize::Zeroizing;
use serde_json::json;

use crate::algorithms::{self, Cipher, Mode, Oneway};
use crate::error::{Error, Result};
use crate::random;
use crate::raw;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

/// Configuration a fresh secret key gets unless told otherwise.
pub mod defaults {
    use super::{Cipher, Mode, Oneway};

    pub const CIPHER: Cipher = Cipher::Aes256;
    pub const MODE: Mode = Mode::Cbc;
    pub const ONEWAY: Oneway = Oneway::Sha256;
}

/// A secret key for the symmetric cryptosystem: the secret itself plus
/// the cipher, mode and oneway its streams are produced with.
///
/// The secret is zeroed on release.
#[derive(Clone)]
pub struct SecretKey {
    secret: Zeroizing<Vec<u8>>,
    cipher: Cipher,
    mode: Mode,
    oneway: Oneway,
}

impl SecretKey {
    #[must_use]
    pub fn new(secret: Vec<u8>, cipher: Cipher, mode: Mode, oneway: Oneway) -> Self {
        Self {
            secret: Zeroizing::new(secret),
            cipher,
            mode,
            oneway,
        }
    }

    /// Generate a `length`-bit key with the default configuration.
    ///
    /// # Errors
    ///
    /// Errors if the provider RNG fails.
    pub fn generate(length: u32) -> Result<Self> {
        let secret = random::bytes((length as usize).div_ceil(8))?;
        Ok(Self::new(
            secret,
            defaults::CIPHER,
            defaults::MODE,
            defaults::ONEWAY,
        ))
    }

    /// Encipher a plain text into a salted stream.
    ///
    /// # Errors
    ///
    /// Errors if the cipher context fails.
    pub fn encipher(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut code = Vec::new();
        self.encipher_stream(&mut Cursor::new(plain), &mut code)?;
        Ok(code)
    }

    /// Encipher a stream of plain bytes into a salted stream.
    ///
    /// # Errors
    ///
    /// Errors if the cipher context fails, or if read/write fails.
    pub fn encipher_stream(&self, plain: &mut dyn Read, code: &mut dyn Write) -> Result<()> {
        raw::symmetric::encipher(
            &self.secret,
            algorithms::resolve(self.cipher, self.mode)?,
            self.oneway.resolve()?,
            plain,
            code,
        )
    }

    /// Decipher a salted stream back into the plain text.
    ///
    /// # Errors
    ///
    /// Errors if the stream is not salted, or does not decrypt under
    /// this secret.
    pub fn decipher(&self, code: &[u8]) -> Result<Vec<u8>> {
        let mut plain = Vec::new();
        self.decipher_stream(&mut Cursor::new(code), &mut plain)?;
        Ok(plain)
    }

    /// Decipher a salted stream of bytes.
    ///
    /// # Errors
    ///
    /// Errors if the stream is not salted, does not decrypt under this
    /// secret, or if read/write fails.
    pub fn decipher_stream(&self, code: &mut dyn Read, plain: &mut dyn Write) -> Result<()> {
        raw::symmetric::decipher(
            &self.secret,
            algorithms::resolve(self.cipher, self.mode)?,
            self.oneway.resolve()?,
            code,
            plain,
        )
    }

    /// The key's size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.secret.len()
    }

    /// The key's length in bits.
    #[must_use]
    pub fn length(&self) -> u32 {
        (self.secret.len() * 8) as u32
    }

    #[must_use]
    pub fn cipher(&self) -> Cipher {
        self.cipher
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn oneway(&self) -> Oneway {
        self.oneway
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Serialize with the binary codec.
    #[must_use]
    pub fn to_bytes(&self, profile: Profile) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_u16(&mut out, profile.format());
        wire::put_bytes(&mut out, &self.secret);
        wire::put_u8(&mut out, self.cipher as u8);
        wire::put_u8(&mut out, self.mode as u8);
        wire::put_u8(&mut out, self.oneway as u8);
        out
    }

    /// Deserialize from the binary codec.
    ///
    /// # Errors
    ///
    /// Errors on truncated input or an unknown format discriminant.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = wire::Reader::new(bytes);
        let format = reader.u16()?;
        match format {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }
        let secret = reader.bytes()?.to_vec();
        let cipher = Cipher::from_discriminant(reader.u8()?)?;
        let mode = Mode::from_discriminant(reader.u8()?)?;
        let oneway = Oneway::from_discriminant(reader.u8()?)?;
        reader.finish()?;

        Ok(Self::new(secret, cipher, mode, oneway))
    }

    /// Serialize as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        json!({
            "type": "secret_key",
            "format": FORMAT_2,
            "secret": json::buffer(&self.secret),
            "cipher": self.cipher as u8,
            "mode": self.mode as u8,
            "oneway": self.oneway as u8,
        })
        .to_string()
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Errors on malformed JSON or an unknown format discriminant.
    pub fn from_json(text: &str) -> Result<Self> {
        let object = json::parse(text)?;
        match json::check_schema(&object, "secret_key")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }

        Ok(Self::new(
            json::get_buffer(&object, "secret")?,
            Cipher::from_discriminant(json::get_u8(&object, "cipher")?)?,
            Mode::from_discriminant(json::get_u8(&object, "mode")?)?,
            Oneway::from_discriminant(json::get_u8(&object, "oneway")?)?,
        ))
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        *self.secret == *other.secret
            && self.cipher == other.cipher
            && self.mode == other.mode
            && self.oneway == other.oneway
    }
}

impl Eq for SecretKey {}

impl Hash for SecretKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.secret).hash(state);
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret itself.
        write!(
            f,
            "SecretKey({} bits, {}-{}, {})",
            self.length(),
            self.cipher,
            self.mode,
            self.oneway
        )
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn generate_has_requested_length() {
        let key = SecretKey::generate(256).unwrap();

        assert_eq!(key.length(), 256);
        assert_eq!(key.size(), 32);
    }

    #[test]
    fn encipher_decipher_roundtrip() {
        let key = SecretKey::generate(256).unwrap();

        let code = key.encipher(b"hello, world!").unwrap();
        assert_eq!(&code[..8], b"Salted__");

        let plain = key.decipher(&code).unwrap();
        assert_eq!(plain, b"hello, world!");
    }

    #[test]
    fn binary_roundtrip() {
        let key = SecretKey::generate(256).unwrap();

        let decoded = SecretKey::from_bytes(&key.to_bytes(Profile::Modern)).unwrap();

        assert_eq!(decoded, key);
    }

    #[test]
    fn json_roundtrip() {
        let key = SecretKey::generate(128).unwrap();

        let decoded = SecretKey::from_json(&key.to_json()).unwrap();

        assert_eq!(decoded, key);
    }

    #[test]
    fn unknown_format_is_a_format_error() {
        let key = SecretKey::generate(128).unwrap();
        let mut bytes = key.to_bytes(Profile::Modern);
        bytes[0] = 0xbe;
        bytes[1] = 0xef;

        let err = SecretKey::from_bytes(&bytes).unwrap_err();

        assert_eq!(err, Error::Format(0xbeef));
    }

    #[test]
    fn display_does_not_leak_the_secret() {
        let key = SecretKey::new(
            b"very secret".to_vec(),
            Cipher::Aes256,
            Mode::Cbc,
            Oneway::Sha256,
        );

        let printed = key.to_string();

        assert!(!printed.contains("very secret"));
    }
}
