//! DSA private keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read};

use openssl::dsa::Dsa;
use openssl::pkey::{Id, PKey, Private};
use secrecy::zeroize::Zeroizing;
use serde_json::{Value, json};

use crate::algorithms::Oneway;
use crate::error::{Error, Result};
use crate::provider;
use crate::raw;
use crate::raw::asymmetric::ApplyConfig;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

/// A private key in the DSA asymmetric cryptosystem.
#[derive(Clone)]
pub struct PrivateKey {
    key: PKey<Private>,
    /// Traditional DER of the full key; the key's canonical identity.
    der: Zeroizing<Vec<u8>>,
    length: u32,
    oneway: Oneway,
}

impl PrivateKey {
    /// Take ownership of a provider key.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks.
    pub fn from_dsa(dsa: Dsa<Private>, oneway: Oneway) -> Result<Self> {
        provider::require();

        let length = u32::try_from(dsa.p().num_bits()).unwrap_or(0);
        let key = PKey::from_dsa(dsa)?;
        let der = Zeroizing::new(key.private_key_to_der()?);

        let private = Self {
            key,
            der,
            length,
            oneway,
        };
        private.check()?;

        Ok(private)
    }

    /// Wrap an already-built provider handle.
    ///
    /// # Errors
    ///
    /// Errors if the handle is not a DSA key, or fails its structural
    /// checks.
    pub(crate) fn from_pkey(key: PKey<Private>, oneway: Oneway) -> Result<Self> {
        if key.id() != Id::DSA {
            return Err(Error::InvalidKey("not a DSA key".to_string()));
        }
        Self::from_dsa(key.dsa()?, oneway)
    }

    /// Decode a traditional DER private key.
    ///
    /// # Errors
    ///
    /// Errors if the bytes are not a DER DSA private key.
    pub fn from_der(der: &[u8], oneway: Oneway) -> Result<Self> {
        let key =
            PKey::private_key_from_der(der).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_pkey(key, oneway)
    }

    /// Sign a plain text and return the signature.
    ///
    /// # Errors
    ///
    /// Errors if the signature context fails.
    pub fn sign(&self, plain: &[u8]) -> Result<Vec<u8>> {
        self.sign_stream(&mut Cursor::new(plain))
    }

    /// Sign a stream of plain bytes.
    ///
    /// # Errors
    ///
    /// Errors if the signature context fails or the stream breaks
    /// mid-read.
    pub fn sign_stream(&self, plain: &mut dyn Read) -> Result<Vec<u8>> {
        raw::asymmetric::sign(
            &self.key,
            self.oneway.resolve()?,
            ApplyConfig::default(),
            plain,
        )
    }

    /// The key's size in bytes (the upper bound of a signature).
    #[must_use]
    pub fn size(&self) -> usize {
        self.key.size()
    }

    /// The key's length in bits.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// The digest algorithm this key signs with.
    #[must_use]
    pub fn oneway(&self) -> Oneway {
        self.oneway
    }

    /// The key's traditional DER encoding.
    #[must_use]
    pub fn to_der(&self) -> Zeroizing<Vec<u8>> {
        self.der.clone()
    }

    pub(crate) fn key(&self) -> &PKey<Private> {
        &self.key
    }

    /// Serialize with the binary codec.
    #[must_use]
    pub fn to_bytes(&self, profile: Profile) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_u16(&mut out, profile.format());
        wire::put_bytes(&mut out, &self.der);
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
        let der = reader.bytes()?.to_vec();
        let oneway = Oneway::from_discriminant(reader.u8()?)?;
        reader.finish()?;

        Self::from_der(&der, oneway)
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({
            "type": "dsa.private_key",
            "format": FORMAT_2,
            "der": json::buffer(&self.der),
            "oneway": self.oneway as u8,
        })
    }

    pub(crate) fn from_value(object: &Value) -> Result<Self> {
        match json::check_schema(object, "dsa.private_key")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }
        Self::from_der(
            &json::get_buffer(object, "der")?,
            Oneway::from_discriminant(json::get_u8(object, "oneway")?)?,
        )
    }

    /// Serialize as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Errors on malformed JSON or an unknown format discriminant.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(&json::parse(text)?)
    }

    /// Check that the key is valid.
    fn check(&self) -> Result<()> {
        if self.length == 0 {
            return Err(Error::InvalidKey("the prime is empty".to_string()));
        }
        Ok(())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.der == *other.der && self.oneway == other.oneway
    }
}

impl Eq for PrivateKey {}

impl Hash for PrivateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.der).hash(state);
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "PrivateKey(dsa, {} bits, {})", self.length, self.oneway)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn generated_key_has_the_requested_length() {
        let dsa = Dsa::generate(1024).unwrap();
        let private = PrivateKey::from_dsa(dsa, Oneway::Sha256).unwrap();

        assert_eq!(private.length(), 1024);
        assert_eq!(private.oneway(), Oneway::Sha256);
    }

    #[test]
    fn binary_roundtrip() {
        let private = PrivateKey::from_dsa(Dsa::generate(1024).unwrap(), Oneway::Sha256).unwrap();

        let decoded = PrivateKey::from_bytes(&private.to_bytes(Profile::Modern)).unwrap();

        assert_eq!(decoded, private);
    }

    #[test]
    fn json_roundtrip() {
        let private = PrivateKey::from_dsa(Dsa::generate(1024).unwrap(), Oneway::Sha1).unwrap();

        let decoded = PrivateKey::from_json(&private.to_json()).unwrap();

        assert_eq!(decoded, private);
        assert_eq!(decoded.oneway(), Oneway::Sha1);
    }
}
