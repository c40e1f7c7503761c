//! RSA public keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read, Write};

use base64::prelude::{BASE64_STANDARD, Engine as _};
use openssl::pkey::{PKey, Public};
use openssl::rsa::Rsa;
use serde_json::{Value, json};

use crate::envelope;
use crate::error::{Error, Result};
use crate::provider;
use crate::raw;
use crate::raw::asymmetric::ApplyConfig;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::{Options, PrivateKey, Seed};

/// A public key in the RSA asymmetric cryptosystem.
///
/// Two public keys are equal iff their modulus and exponent are; the
/// total order is the lexicographic order of their DER encodings.
#[derive(Clone)]
pub struct PublicKey {
    key: PKey<Public>,
    /// PKCS#1 DER of `(n, e)`; the key's canonical identity.
    der: Vec<u8>,
    length: u32,
    options: Options,
}

impl PublicKey {
    /// Take ownership of a provider key.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks.
    pub fn from_rsa(rsa: Rsa<Public>) -> Result<Self> {
        Self::from_rsa_with(rsa, Options::default())
    }

    /// Take ownership of a provider key, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks.
    pub fn from_rsa_with(rsa: Rsa<Public>, options: Options) -> Result<Self> {
        provider::require();

        let der = rsa.public_key_to_der_pkcs1()?;
        let length = u32::try_from(rsa.n().num_bits()).unwrap_or(0);
        let key = PKey::from_rsa(rsa)?;

        let public = Self {
            key,
            der,
            length,
            options,
        };
        public.check()?;

        Ok(public)
    }

    /// Project a private key onto its public half.
    ///
    /// # Errors
    ///
    /// Errors if the provider cannot re-encode the public components.
    pub fn from_private(private: &PrivateKey) -> Result<Self> {
        let rsa = private.key().rsa()?;
        let der = rsa.public_key_to_der_pkcs1()?;
        let public = Rsa::public_key_from_der_pkcs1(&der)?;

        Self::from_rsa_with(public, private.options())
    }

    /// Decode a PKCS#1 DER public key.
    ///
    /// # Errors
    ///
    /// Errors if the bytes are not a DER public key.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::from_der_with(der, Options::default())
    }

    /// Decode a PKCS#1 DER public key, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the bytes are not a DER public key.
    pub fn from_der_with(der: &[u8], options: Options) -> Result<Self> {
        let rsa = Rsa::public_key_from_der_pkcs1(der)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_rsa_with(rsa, options)
    }

    /// Deduce the public half of the key pair a seed stands for.
    ///
    /// # Errors
    ///
    /// Errors if the seed cannot drive a derivation (too short, odd
    /// length).
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        let private = PrivateKey::from_seed(seed)?;
        Self::from_private(&private)
    }

    /// Replace the key's operation options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Encrypt a plain text with the raw public key.
    ///
    /// This cannot handle more than one modulus worth of bytes (minus
    /// the padding overhead); for arbitrary sizes, use [`Self::seal`].
    ///
    /// # Errors
    ///
    /// Errors if the plain text is too large for the modulus.
    pub fn encrypt(&self, plain: &[u8]) -> Result<Vec<u8>> {
        raw::asymmetric::encrypt(&*self.key.rsa()?, self.options.encryption_padding, plain)
    }

    /// Encrypt a plain text of any size into an envelope.
    ///
    /// # Errors
    ///
    /// Errors if the wrap or the symmetric encipherment fails.
    pub fn seal(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut code = Vec::new();
        self.seal_stream(&mut Cursor::new(plain), &mut code)?;
        Ok(code)
    }

    /// Encrypt a stream of plain bytes into an envelope.
    ///
    /// # Errors
    ///
    /// Errors if the wrap or the symmetric encipherment fails, or if
    /// read/write fails.
    pub fn seal_stream(&self, plain: &mut dyn Read, code: &mut dyn Write) -> Result<()> {
        envelope::seal(
            &*self.key.rsa()?,
            self.options.encryption_padding,
            self.options.envelope_cipher,
            self.options.envelope_mode,
            self.options.oneway,
            plain,
            code,
        )
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
            self.options.oneway.resolve()?,
            ApplyConfig::with_padding(self.options.signature_padding),
            signature,
            plain,
        )
    }

    /// Unrotate a seed: the inverse, under this public key, of the
    /// private key's rotation.
    ///
    /// # Errors
    ///
    /// Errors if the seed is not modulus-sized.
    pub fn unrotate(&self, seed: &Seed) -> Result<Seed> {
        let unrotated = raw::asymmetric::unrotate(&*self.key.rsa()?, seed.buffer())?;
        Seed::new(unrotated, seed.length())
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

    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// The key's PKCS#1 DER encoding.
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
        reader.finish()?;

        Self::from_der(&der)
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({
            "type": "rsa.public_key",
            "format": FORMAT_2,
            "der": json::buffer(&self.der),
        })
    }

    pub(crate) fn from_value(object: &Value) -> Result<Self> {
        match json::check_schema(object, "rsa.public_key")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }
        Self::from_der(&json::get_buffer(object, "der")?)
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
            return Err(Error::InvalidKey("the modulus is empty".to_string()));
        }

        let rsa = self.key.rsa()?;
        if u32::try_from(rsa.n().num_bits()).unwrap_or(0) != self.length {
            return Err(Error::InvalidKey(
                "the modulus disagrees with the declared length".to_string(),
            ));
        }

        Ok(())
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        // DER equality is (n, e) equality.
        self.der == other.der
    }
}

impl Eq for PublicKey {}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.der.cmp(&other.der)
    }
}

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
    use super::*;

    fn key_pair() -> (PublicKey, PrivateKey) {
        let rsa = Rsa::generate(2048).unwrap();
        let private = PrivateKey::from_rsa(rsa).unwrap();
        let public = PublicKey::from_private(&private).unwrap();
        (public, private)
    }

    #[test]
    fn projection_keeps_the_length() {
        let (public, private) = key_pair();

        assert_eq!(public.length(), 2048);
        assert_eq!(public.length(), private.length());
        assert_eq!(public.size(), 256);
    }

    #[test]
    fn der_roundtrip() {
        let (public, _) = key_pair();

        let decoded = PublicKey::from_der(&public.to_der()).unwrap();

        assert_eq!(decoded, public);
    }

    #[test]
    fn binary_roundtrip() {
        let (public, _) = key_pair();

        let decoded = PublicKey::from_bytes(&public.to_bytes(Profile::Modern)).unwrap();

        assert_eq!(decoded, public);
    }

    #[test]
    fn json_roundtrip() {
        let (public, _) = key_pair();

        let decoded = PublicKey::from_json(&public.to_json()).unwrap();

        assert_eq!(decoded, public);
    }

    #[test]
    fn distinct_keys_are_ordered() {
        let (first, _) = key_pair();
        let (second, _) = key_pair();

        assert_ne!(first, second);
        // The DER order is total: one strictly precedes the other.
        assert_ne!(first.cmp(&second), Ordering::Equal);
        assert_eq!(first.cmp(&second), second.cmp(&first).reverse());
    }

    #[test]
    fn garbage_der_is_a_serialization_error() {
        let err = PublicKey::from_der(b"not a key at all").unwrap_err();

        assert!(matches!(err, Error::Serialization(_)));
    }
}
