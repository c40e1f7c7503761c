//! DH public keys.

use std::fmt;
use std::hash::{Hash, Hasher};

use openssl::bn::BigNum;
use openssl::dh::Dh;
use openssl::pkey::{Id, PKey, Public};
use serde_json::json;

use crate::error::{Error, Result};
use crate::provider;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::PrivateKey;

/// A public key in the DH asymmetric cryptosystem.
#[derive(Clone)]
pub struct PublicKey {
    key: PKey<Public>,
    /// Binary codec over `(p, g, public)`; the key's identity.
    encoding: Vec<u8>,
    length: u32,
}

impl PublicKey {
    /// Project a private key onto its public half.
    ///
    /// The provider has no direct projection; the public components are
    /// round-tripped through their SubjectPublicKeyInfo encoding.
    ///
    /// # Errors
    ///
    /// Errors if the provider cannot re-encode the public components.
    pub fn from_private(private: &PrivateKey) -> Result<Self> {
        provider::require();

        let der = private.key().public_key_to_der()?;
        let key = PKey::public_key_from_der(&der)?;
        if key.id() != Id::DH {
            return Err(Error::InvalidKey("not a DH key".to_string()));
        }

        Self::from_pkey(key)
    }

    /// Take ownership of a provider key.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks.
    pub fn from_dh(dh: Dh<Public>) -> Result<Self> {
        provider::require();

        let length = u32::try_from(dh.prime_p().num_bits()).unwrap_or(0);
        if length == 0 {
            return Err(Error::InvalidKey("the prime is empty".to_string()));
        }

        let encoding = encode(
            &dh.prime_p().to_vec(),
            &dh.generator().to_vec(),
            &dh.public_key().to_vec(),
        );
        let key = PKey::from_dh(dh)?;

        Ok(Self {
            key,
            encoding,
            length,
        })
    }

    fn from_pkey(key: PKey<Public>) -> Result<Self> {
        let dh = key.dh()?;

        let length = u32::try_from(dh.prime_p().num_bits()).unwrap_or(0);
        if length == 0 {
            return Err(Error::InvalidKey("the prime is empty".to_string()));
        }

        let encoding = encode(
            &dh.prime_p().to_vec(),
            &dh.generator().to_vec(),
            &dh.public_key().to_vec(),
        );

        Ok(Self {
            key,
            encoding,
            length,
        })
    }

    /// The key's size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        (self.length as usize).div_ceil(8)
    }

    /// The key's length in bits.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    pub(crate) fn key(&self) -> &PKey<Public> {
        &self.key
    }

    /// Serialize with the binary codec.
    ///
    /// An in-process identity, not a persistence format.
    #[must_use]
    pub fn to_bytes(&self, profile: Profile) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_u16(&mut out, profile.format());
        out.extend_from_slice(&self.encoding);
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

        let p = BigNum::from_slice(reader.bytes()?)?;
        let g = BigNum::from_slice(reader.bytes()?)?;
        let public = BigNum::from_slice(reader.bytes()?)?;
        reader.finish()?;

        let dh = Dh::from_pqg(p, None, g)?.set_public_key(public)?;
        Self::from_dh(dh)
    }

    /// Serialize as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut reader = wire::Reader::new(&self.encoding);
        let p = reader.bytes().unwrap_or_default();
        let g = reader.bytes().unwrap_or_default();
        let public = reader.bytes().unwrap_or_default();

        json!({
            "type": "dh.public_key",
            "format": FORMAT_2,
            "prime": json::buffer(p),
            "generator": json::buffer(g),
            "public": json::buffer(public),
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
        match json::check_schema(&object, "dh.public_key")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }

        let p = BigNum::from_slice(&json::get_buffer(&object, "prime")?)?;
        let g = BigNum::from_slice(&json::get_buffer(&object, "generator")?)?;
        let public = BigNum::from_slice(&json::get_buffer(&object, "public")?)?;

        let dh = Dh::from_pqg(p, None, g)?.set_public_key(public)?;
        Self::from_dh(dh)
    }
}

/// Length-prefix each component, in order.
fn encode(p: &[u8], g: &[u8], public: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    wire::put_bytes(&mut out, p);
    wire::put_bytes(&mut out, g);
    wire::put_bytes(&mut out, public);
    out
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.encoding == other.encoding
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoding.hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(dh, {} bits)", self.length)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
