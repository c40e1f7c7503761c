//! DSA key pairs.

use std::fmt;
use std::hash::{Hash, Hasher};

use openssl::dsa::Dsa;
use serde_json::json;

use crate::algorithms::{Cryptosystem, Oneway};
use crate::error::{Error, Result};
use crate::provider;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::{PrivateKey, PublicKey};

/// A DSA public/private key pair.
#[derive(Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Pair up a public and a private key.
    ///
    /// # Errors
    ///
    /// Errors if the halves disagree in length.
    pub fn new(public: PublicKey, private: PrivateKey) -> Result<Self> {
        if public.length() != private.length() {
            return Err(Error::InvalidKey(format!(
                "the halves disagree in length: {} versus {}",
                public.length(),
                private.length()
            )));
        }

        Ok(Self { public, private })
    }

    /// Generate a fresh `length`-bit key pair signing with `oneway`.
    ///
    /// The provider first picks the domain parameters `(p, q, g)` for
    /// the requested length, then generates the key under them.
    ///
    /// # Errors
    ///
    /// Errors if either generation phase fails.
    pub fn generate(length: u32, oneway: Oneway) -> Result<Self> {
        provider::require();

        let dsa = Dsa::generate(length)?;
        let private = PrivateKey::from_dsa(dsa, oneway)?;
        let public = PublicKey::from_private(&private)?;

        Self::new(public, private)
    }

    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    #[must_use]
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// The pair's size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.public.size()
    }

    /// The pair's length in bits.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.public.length()
    }

    /// Serialize with the binary codec.
    ///
    /// The legacy profile prepends the outer cryptosystem tag.
    #[must_use]
    pub fn to_bytes(&self, profile: Profile) -> Vec<u8> {
        let mut out = Vec::new();
        if profile == Profile::Legacy {
            wire::put_u8(&mut out, Cryptosystem::Dsa as u8);
        }
        wire::put_u16(&mut out, profile.format());
        wire::put_bytes(&mut out, &self.public.to_bytes(profile));
        wire::put_bytes(&mut out, &self.private.to_bytes(profile));
        out
    }

    /// Deserialize from the binary codec.
    ///
    /// # Errors
    ///
    /// Errors on truncated input, a foreign cryptosystem tag, or an
    /// unknown format discriminant.
    pub fn from_bytes(bytes: &[u8], profile: Profile) -> Result<Self> {
        let mut reader = wire::Reader::new(bytes);

        if profile == Profile::Legacy {
            let tag = Cryptosystem::from_discriminant(reader.u8()?)?;
            if tag != Cryptosystem::Dsa {
                return Err(Error::Serialization(format!(
                    "expected a dsa key pair, got {tag}"
                )));
            }
        }

        let format = reader.u16()?;
        match format {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }

        let public = PublicKey::from_bytes(reader.bytes()?)?;
        let private = PrivateKey::from_bytes(reader.bytes()?)?;
        reader.finish()?;

        Self::new(public, private)
    }

    /// Serialize as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        json!({
            "type": "dsa.key_pair",
            "format": FORMAT_2,
            "public_key": self.public.to_value(),
            "private_key": self.private.to_value(),
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
        match json::check_schema(&object, "dsa.key_pair")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }

        let public = object
            .get("public_key")
            .ok_or_else(|| Error::Serialization("missing field 'public_key'".to_string()))?;
        let private = object
            .get("private_key")
            .ok_or_else(|| Error::Serialization("missing field 'private_key'".to_string()))?;

        Self::new(
            PublicKey::from_value(public)?,
            PrivateKey::from_value(private)?,
        )
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        // The public component is enough to uniquely identify a pair.
        self.public == other.public
    }
}

impl Eq for KeyPair {}

impl Hash for KeyPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public.hash(state);
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.public, self.private)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn generated_halves_agree() {
        let pair = KeyPair::generate(1024, Oneway::Sha256).unwrap();

        assert_eq!(pair.length(), 1024);
        assert_eq!(pair.public_key().length(), pair.private_key().length());
    }

    #[test]
    fn sign_verify_through_the_pair() {
        let pair = KeyPair::generate(1024, Oneway::Sha256).unwrap();

        let signature = pair.private_key().sign(b"hello, world!").unwrap();

        assert!(pair.public_key().verify(&signature, b"hello, world!").unwrap());
    }

    #[test]
    fn binary_roundtrip_both_profiles() {
        let pair = KeyPair::generate(1024, Oneway::Sha256).unwrap();

        let modern =
            KeyPair::from_bytes(&pair.to_bytes(Profile::Modern), Profile::Modern).unwrap();
        assert_eq!(modern, pair);

        let bytes = pair.to_bytes(Profile::Legacy);
        assert_eq!(bytes[0], Cryptosystem::Dsa as u8);
        let legacy = KeyPair::from_bytes(&bytes, Profile::Legacy).unwrap();
        assert_eq!(legacy, pair);
    }

    #[test]
    fn json_roundtrip() {
        let pair = KeyPair::generate(1024, Oneway::Sha256).unwrap();

        let decoded = KeyPair::from_json(&pair.to_json()).unwrap();

        assert_eq!(decoded, pair);
    }
}
