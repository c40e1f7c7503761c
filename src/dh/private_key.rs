//! DH private keys.

use std::fmt;
use std::hash::{Hash, Hasher};

use openssl::bn::BigNum;
use openssl::dh::Dh;
use openssl::pkey::{PKey, Private};
use secrecy::zeroize::Zeroizing;
use serde_json::json;

use crate::error::{Error, Result};
use crate::provider;
use crate::raw;
use crate::secret_key::{SecretKey, defaults};
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::PublicKey;

/// A private key in the DH asymmetric cryptosystem.
#[derive(Clone)]
pub struct PrivateKey {
    key: PKey<Private>,
    /// Binary codec over `(p, g, public, private)`; the key's identity.
    encoding: Zeroizing<Vec<u8>>,
    length: u32,
}

impl PrivateKey {
    /// Generate a private key over fresh `length`-bit parameters.
    ///
    /// Parameter generation searches for a safe prime and dominates the
    /// cost; for a well-known group, see
    /// [`Self::generate_builtin_2048`].
    ///
    /// # Errors
    ///
    /// Errors if either generation phase fails.
    pub fn generate(length: u32) -> Result<Self> {
        provider::require();

        let dh = Dh::generate_params(length, 2)?.generate_key()?;
        Self::from_dh(dh)
    }

    /// Generate a private key over the provider's built-in 2048-bit
    /// MODP group (RFC 5114), skipping the parameter search.
    ///
    /// # Errors
    ///
    /// Errors if the key generation fails.
    pub fn generate_builtin_2048() -> Result<Self> {
        provider::require();

        let dh = Dh::get_2048_256()?.generate_key()?;
        Self::from_dh(dh)
    }

    /// Generate a fresh private key over the same parameters as this
    /// one, so the two can agree.
    ///
    /// # Errors
    ///
    /// Errors if the key generation fails.
    pub fn generate_matching(&self) -> Result<Self> {
        let dh = self.key.dh()?;
        let p = dh.prime_p().to_owned()?;
        let g = dh.generator().to_owned()?;

        let sibling = Dh::from_pqg(p, None, g)?.generate_key()?;
        Self::from_dh(sibling)
    }

    /// Take ownership of a provider key.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks.
    pub fn from_dh(dh: Dh<Private>) -> Result<Self> {
        provider::require();

        let length = u32::try_from(dh.prime_p().num_bits()).unwrap_or(0);
        if length == 0 {
            return Err(Error::InvalidKey("the prime is empty".to_string()));
        }

        let encoding = Zeroizing::new(encode(
            &dh.prime_p().to_vec(),
            &dh.generator().to_vec(),
            &dh.public_key().to_vec(),
            &dh.private_key().to_vec(),
        ));
        let key = PKey::from_dh(dh)?;

        Ok(Self {
            key,
            encoding,
            length,
        })
    }

    /// Compute the shared session secret with the peer's public key.
    ///
    /// Both sides of an exchange derive the same secret:
    /// `a.agree(B) == b.agree(A)`.
    ///
    /// # Errors
    ///
    /// Errors if the two keys do not share parameters.
    pub fn agree(&self, peer: &PublicKey) -> Result<SecretKey> {
        let secret = raw::asymmetric::agree(&self.key, peer.key())?;

        Ok(SecretKey::new(
            secret,
            defaults::CIPHER,
            defaults::MODE,
            defaults::ONEWAY,
        ))
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

    pub(crate) fn key(&self) -> &PKey<Private> {
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
        let private = BigNum::from_slice(reader.bytes()?)?;
        reader.finish()?;

        let dh = Dh::from_pqg(p, None, g)?.set_key(public, private)?;
        Self::from_dh(dh)
    }

    /// Serialize as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        let dh = components(&self.encoding);
        json!({
            "type": "dh.private_key",
            "format": FORMAT_2,
            "prime": json::buffer(dh[0]),
            "generator": json::buffer(dh[1]),
            "public": json::buffer(dh[2]),
            "private": json::buffer(dh[3]),
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
        match json::check_schema(&object, "dh.private_key")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }

        let p = BigNum::from_slice(&json::get_buffer(&object, "prime")?)?;
        let g = BigNum::from_slice(&json::get_buffer(&object, "generator")?)?;
        let public = BigNum::from_slice(&json::get_buffer(&object, "public")?)?;
        let private = BigNum::from_slice(&json::get_buffer(&object, "private")?)?;

        let dh = Dh::from_pqg(p, None, g)?.set_key(public, private)?;
        Self::from_dh(dh)
    }
}

/// Length-prefix each component, in order.
fn encode(p: &[u8], g: &[u8], public: &[u8], private: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    wire::put_bytes(&mut out, p);
    wire::put_bytes(&mut out, g);
    wire::put_bytes(&mut out, public);
    wire::put_bytes(&mut out, private);
    out
}

/// Split an encoding back into its component slices.
fn components(encoding: &[u8]) -> Vec<&[u8]> {
    let mut reader = wire::Reader::new(encoding);
    let mut fields = Vec::with_capacity(4);
    while let Ok(field) = reader.bytes() {
        fields.push(field);
    }
    fields
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.encoding == *other.encoding
    }
}

impl Eq for PrivateKey {}

impl Hash for PrivateKey {
    /// Hashes the binary codec over the key's components — the provider
    /// has no DER for DH, so this identity is only meaningful within
    /// the process.
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.encoding).hash(state);
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "PrivateKey(dh, {} bits)", self.length)
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
    fn generated_key_has_the_group_length() {
        let private = PrivateKey::generate_builtin_2048().unwrap();

        assert_eq!(private.length(), 2048);
        assert_eq!(private.size(), 256);
    }

    #[test]
    fn matching_keys_share_parameters_but_not_secrets() {
        let first = PrivateKey::generate_builtin_2048().unwrap();
        let second = first.generate_matching().unwrap();

        assert_eq!(first.length(), second.length());
        assert_ne!(first, second);
    }

    #[test]
    fn binary_roundtrip() {
        let private = PrivateKey::generate_builtin_2048().unwrap();

        let decoded = PrivateKey::from_bytes(&private.to_bytes(Profile::Modern)).unwrap();

        assert_eq!(decoded, private);
    }

    #[test]
    fn json_roundtrip() {
        let private = PrivateKey::generate_builtin_2048().unwrap();

        let decoded = PrivateKey::from_json(&private.to_json()).unwrap();

        assert_eq!(decoded, private);
    }

    #[test]
    fn small_parameter_generation_works_end_to_end() {
        // Full parameter search, kept small: safe primes of this size
        // are found in well under a second.
        let private = PrivateKey::generate(512).unwrap();

        assert_eq!(private.length(), 512);
    }
}
