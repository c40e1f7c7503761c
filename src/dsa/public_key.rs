//! DSA public keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read};

use base64::prelude::{BASE64_STANDARD, Engine as _};
use openssl::pkey::{Id, PKey, Public};
use serde_json::{Value, json};

use crate::algorithms::Oneway;
use crate::error::{Error, Result};
use crate::provider;
use crate::raw;
use crate::raw::asymmetric::ApplyConfig;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::PrivateKey;

/// A public key in the DSA asymmetric cryptosystem.
#[derive(Clone)]
pub struct PublicKey {
    key: PKey<Public>,
    /// SubjectPublicKeyInfo DER; the key's canonical identity.
    der: Vec<u8>,
    length: u32,
    oneway: Oneway,
}

impl PublicKey {
    /// Project a private key onto its public half.
    ///
    /// The provider has no direct projection; the public components are
    /// round-tripped through their DER encoding.
    ///
    /// # Errors
    ///
    /// Errors if the provider cannot re-encode the public components.
    pub fn from_private(private: &PrivateKey) -> Result<Self> {
        provider::require();

        let der = private.key().public_key_to_der()?;
        let key = PKey::public_key_from_der(&der)?;

        Self::from_pkey(key, private.oneway())
    }

    /// Wrap an already-built provider handle.
    ///
    /// # Errors
    ///
    /// Errors if the handle is not a DSA key, or fails its structural
    /// checks.
    pub(crate) fn from_pkey(key: PKey<Public>, oneway: Oneway) -> Result<Self> {
        if key.id() != Id::DSA {
            return Err(Error::InvalidKey("not a DSA key".to_string()));
        }

        let der = key.public_key_to_der()?;
        let length = u32::try_from(key.dsa()?.p().num_bits()).unwrap_or(0);

        let public = Self {
            key,
            der,
            length,
            oneway,
        };
        public.check()?;

        Ok(public)
    }

    /// Decode a SubjectPublicKeyInfo DER public key.
    ///
    /// # Errors
    ///
    /// Errors if the bytes are not a DER DSA public key.
    pub fn from_der(der: &[u8], oneway: Oneway) -> Result<Self> {
        let key =
            PKey::public_key_from_der(der).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_pkey(key, oneway)
    }

    /// Whether the signature matches the plain text.
    ///
    /// # Errors
    ///
    /// Errors if the verify context fails; a mismatch is `Ok(false)`.
    pub fn verify(&self, signature: &[u8], plain: &[u8]) -> Result<bool> {
        self.verify_stream(signature, &mut Cursor::new(plain))
    }

    /// Whether the signature matches the stream of plain bytes.
    ///
    /// # Errors
    ///
    /// Errors if the verify context fails or the stream breaks
    /// mid-read; a mismatch is `Ok(false)`.
    pub fn verify_stream(&self, signature: &[u8], plain: &mut dyn Read) -> Result<bool> {
        raw::asymmetric::verify(
            &self.key,
            self.oneway.resolve()?,
            ApplyConfig::default(),
            signature,
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

    /// The digest algorithm this key verifies with.
    #[must_use]
    pub fn oneway(&self) -> Oneway {
        self.oneway
    }

    /// The key's SubjectPublicKeyInfo DER encoding.
    #[must_use]
    pub fn to_der(&self) -> Vec<u8> {
        self.der.clone()
    }

    pub(crate) fn key(&self) -> &PKey<Public> {
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
            "type": "dsa.public_key",
            "format": FORMAT_2,
            "der": json::buffer(&self.der),
            "oneway": self.oneway as u8,
        })
    }

    pub(crate) fn from_value(object: &Value) -> Result<Self> {
        match json::check_schema(object, "dsa.public_key")? {
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

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fingerprint = BASE64_STANDARD.encode(&self.der[..self.der.len().min(9)]);
        write!(f, "PublicKey({fingerprint}…)")
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
pub mod tests {
    use openssl::dsa::Dsa;

    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let private = PrivateKey::from_dsa(Dsa::generate(1024).unwrap(), Oneway::Sha256).unwrap();
        let public = PublicKey::from_private(&private).unwrap();

        let signature = private.sign(b"hello, world!").unwrap();

        assert!(public.verify(&signature, b"hello, world!").unwrap());
        assert!(!public.verify(&signature, b"hello, world?").unwrap());
    }

    #[test]
    fn tampered_signature_verifies_false() {
        let private = PrivateKey::from_dsa(Dsa::generate(1024).unwrap(), Oneway::Sha256).unwrap();
        let public = PublicKey::from_private(&private).unwrap();

        let mut signature = private.sign(b"hello, world!").unwrap();
        *signature.last_mut().unwrap() ^= 0x01;

        assert!(!public.verify(&signature, b"hello, world!").unwrap());
    }

    #[test]
    fn binary_roundtrip() {
        let private = PrivateKey::from_dsa(Dsa::generate(1024).unwrap(), Oneway::Sha256).unwrap();
        let public = PublicKey::from_private(&private).unwrap();

        let decoded = PublicKey::from_bytes(&public.to_bytes(Profile::Modern)).unwrap();

        assert_eq!(decoded, public);
    }

    #[test]
    fn json_roundtrip() {
        let private = PrivateKey::from_dsa(Dsa::generate(1024).unwrap(), Oneway::Sha256).unwrap();
        let public = PublicKey::from_private(&private).unwrap();

        let decoded = PublicKey::from_json(&public.to_json()).unwrap();

        assert_eq!(decoded, public);
    }
}
