//! RSA key pairs.

use std::fmt;
use std::hash::{Hash, Hasher};

use openssl::rsa::Rsa;
use serde_json::json;

use crate::algorithms::Cryptosystem;
use crate::error::{Error, Result};
use crate::provider;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::{Options, PrivateKey, PublicKey, Seed};

/// An RSA public/private key pair.
///
/// The two halves always agree on length; the public half alone
/// identifies the pair.
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

    /// Generate a fresh `length`-bit key pair.
    ///
    /// # Errors
    ///
    /// Errors if the provider's key generation fails.
    pub fn generate(length: u32) -> Result<Self> {
        Self::generate_with(length, Options::default())
    }

    /// Generate a fresh `length`-bit key pair, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the provider's key generation fails.
    pub fn generate_with(length: u32, options: Options) -> Result<Self> {
        provider::require();

        let rsa = Rsa::generate(length)?;
        let private = PrivateKey::from_rsa_with(rsa, options)?;
        let public = PublicKey::from_private(&private)?;

        Self::new(public, private)
    }

    /// Deduce the key pair a seed stands for, deterministically.
    ///
    /// # Errors
    ///
    /// Errors if the seed cannot drive a derivation.
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        Self::from_seed_with(seed, Options::default())
    }

    /// Deduce the key pair a seed stands for, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the seed cannot drive a derivation.
    pub fn from_seed_with(seed: &Seed, options: Options) -> Result<Self> {
        let private = PrivateKey::from_seed_with(seed, options)?;
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
    /// The legacy profile prepends the outer cryptosystem tag the
    /// previous major version used to write.
    #[must_use]
    pub fn to_bytes(&self, profile: Profile) -> Vec<u8> {
        let mut out = Vec::new();
        if profile == Profile::Legacy {
            wire::put_u8(&mut out, Cryptosystem::Rsa as u8);
        }
        wire::put_u16(&mut out, profile.format());
        wire::put_bytes(&mut out, &self.public.to_bytes(profile));
        wire::put_bytes(&mut out, &self.private.to_bytes(profile));
        out
    }

    /// Deserialize from the binary codec.
    ///
    /// In the legacy profile, the outer cryptosystem tag is consumed
    /// (and checked) first.
    ///
    /// # Errors
    ///
    /// Errors on truncated input, a foreign cryptosystem tag, or an
    /// unknown format discriminant.
    pub fn from_bytes(bytes: &[u8], profile: Profile) -> Result<Self> {
        let mut reader = wire::Reader::new(bytes);

        if profile == Profile::Legacy {
            let tag = Cryptosystem::from_discriminant(reader.u8()?)?;
            if tag != Cryptosystem::Rsa {
                return Err(Error::Serialization(format!(
                    "expected an rsa key pair, got {tag}"
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
            "type": "rsa.key_pair",
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
        match json::check_schema(&object, "rsa.key_pair")? {
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
