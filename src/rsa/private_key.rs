//! RSA private keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read, Write};

use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use secrecy::zeroize::Zeroizing;
use serde_json::{Value, json};

use crate::algorithms::{Cipher, Mode, Oneway, Padding};
use crate::envelope;
use crate::error::{Error, Result};
use crate::provider;
use crate::raw;
use crate::raw::asymmetric::ApplyConfig;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

use super::{Options, Seed, deduce};

/// A private key in the RSA asymmetric cryptosystem.
///
/// The key's DER encoding — its canonical identity — is zeroed on
/// release.
#[derive(Clone)]
pub struct PrivateKey {
    key: PKey<Private>,
    /// PKCS#1 DER of the full key; the key's canonical identity.
    der: Zeroizing<Vec<u8>>,
    length: u32,
    options: Options,
}

impl PrivateKey {
    /// Take ownership of a provider key.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks.
    pub fn from_rsa(rsa: Rsa<Private>) -> Result<Self> {
        Self::from_rsa_with(rsa, Options::default())
    }

    /// Take ownership of a provider key, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the key fails its structural checks (inconsistent CRT
    /// parameters included).
    pub fn from_rsa_with(rsa: Rsa<Private>, options: Options) -> Result<Self> {
        provider::require();

        let der = Zeroizing::new(rsa.private_key_to_der()?);
        let length = u32::try_from(rsa.n().num_bits()).unwrap_or(0);
        let key = PKey::from_rsa(rsa)?;

        let private = Self {
            key,
            der,
            length,
            options,
        };
        private.check()?;

        Ok(private)
    }

    /// Decode a PKCS#1 DER private key.
    ///
    /// # Errors
    ///
    /// Errors if the bytes are not a DER private key, or the decoded
    /// key fails its structural checks.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::from_der_with(der, Options::default())
    }

    /// Decode a PKCS#1 DER private key, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the bytes are not a DER private key, or the decoded
    /// key fails its structural checks.
    pub fn from_der_with(der: &[u8], options: Options) -> Result<Self> {
        let rsa =
            Rsa::private_key_from_der(der).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_rsa_with(rsa, options)
    }

    /// Deduce the private key a seed stands for, deterministically.
    ///
    /// # Errors
    ///
    /// Errors if the seed cannot drive a derivation (too short, odd
    /// length).
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        Self::from_seed_with(seed, Options::default())
    }

    /// Deduce the private key a seed stands for, with explicit options.
    ///
    /// # Errors
    ///
    /// Errors if the seed cannot drive a derivation.
    pub fn from_seed_with(seed: &Seed, options: Options) -> Result<Self> {
        Self::from_rsa_with(deduce::rsa(seed)?, options)
    }

    /// Replace the key's operation options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Decrypt a code with the raw private key.
    ///
    /// The counterpart of [`super::PublicKey::encrypt`]; for envelopes,
    /// use [`Self::open`].
    ///
    /// # Errors
    ///
    /// Errors if the code does not decrypt under this key and padding.
    pub fn decrypt(&self, code: &[u8]) -> Result<Vec<u8>> {
        raw::asymmetric::decrypt(&*self.key.rsa()?, self.options.encryption_padding, code)
    }

    /// Open an envelope and return the original plain text.
    ///
    /// # Errors
    ///
    /// Errors if the envelope was not sealed for this key, or its
    /// payload is corrupt.
    pub fn open(&self, code: &[u8]) -> Result<Vec<u8>> {
        let mut plain = Vec::new();
        self.open_stream(&mut Cursor::new(code), &mut plain)?;
        Ok(plain)
    }

    /// Open a stream-based envelope into the output stream.
    ///
    /// # Errors
    ///
    /// Errors if the envelope was not sealed for this key, its payload
    /// is corrupt, or read/write fails.
    pub fn open_stream(&self, code: &mut dyn Read, plain: &mut dyn Write) -> Result<()> {
        envelope::open(
            &*self.key.rsa()?,
            self.options.encryption_padding,
            self.options.envelope_cipher,
            self.options.envelope_mode,
            self.options.oneway,
            code,
            plain,
        )
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
            self.options.oneway.resolve()?,
            ApplyConfig::with_padding(self.options.signature_padding),
            plain,
        )
    }

    /// Rotate a seed: a raw, deterministic private-key application that
    /// yields another modulus-sized seed.
    ///
    /// # Errors
    ///
    /// Errors if the seed is not modulus-sized.
    pub fn rotate(&self, seed: &Seed) -> Result<Seed> {
        let rotated = raw::asymmetric::rotate(&*self.key.rsa()?, seed.buffer())?;
        Seed::new(rotated, seed.length())
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
    pub fn to_der(&self) -> Zeroizing<Vec<u8>> {
        self.der.clone()
    }

    pub(crate) fn key(&self) -> &PKey<Private> {
        &self.key
    }

    /// Serialize with the binary codec.
    ///
    /// The two profiles differ in the format discriminant they write;
    /// the option defaults the legacy formats imply are substituted
    /// back on read.
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
        let options = Self::options_for(format)?;
        let der = reader.bytes()?.to_vec();
        reader.finish()?;

        Self::from_der_with(&der, options)
    }

    pub(crate) fn to_value(&self) -> Value {
        json!({
            "type": "rsa.private_key",
            "format": FORMAT_2,
            "der": json::buffer(&self.der),
        })
    }

    pub(crate) fn from_value(object: &Value) -> Result<Self> {
        let format = json::check_schema(object, "rsa.private_key")?;
        let options = Self::options_for(format)?;
        Self::from_der_with(&json::get_buffer(object, "der")?, options)
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

    /// The option defaults each serialization format implies.
    fn options_for(format: u16) -> Result<Options> {
        Ok(match format {
            FORMAT_0 => Options {
                encryption_padding: Padding::Oaep,
                signature_padding: Padding::Pkcs1,
                oneway: Oneway::Sha256,
                envelope_cipher: Cipher::Aes256,
                envelope_mode: Mode::Cbc,
            },
            FORMAT_1 => Options {
                encryption_padding: Padding::Pkcs1,
                signature_padding: Padding::Pkcs1,
                oneway: Oneway::Sha256,
                envelope_cipher: Cipher::Aes256,
                envelope_mode: Mode::Cbc,
            },
            FORMAT_2 => Options::default(),
            unknown => return Err(Error::Format(unknown)),
        })
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

        // Factors and CRT parameters must be internally consistent.
        if !rsa.check_key()? {
            return Err(Error::InvalidKey(
                "the key's components are inconsistent".to_string(),
            ));
        }

        Ok(())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.der == *other.der
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
        write!(f, "PrivateKey({} bits)", self.length)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
pub mod tests {
    use super::super::PublicKey;
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let public = PublicKey::from_private(&private).unwrap();

        let code = public.encrypt(b"hello, world!").unwrap();
        let plain = private.decrypt(&code).unwrap();

        assert_eq!(plain, b"hello, world!");
    }

    #[test]
    fn sign_verify_roundtrip() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let public = PublicKey::from_private(&private).unwrap();

        let signature = private.sign(b"hello, world!").unwrap();
        assert_eq!(signature.len(), private.size());

        assert!(public.verify(&signature, b"hello, world!").unwrap());
        assert!(!public.verify(&signature, b"hello, world?").unwrap());
    }

    #[test]
    fn binary_roundtrip() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let decoded = PrivateKey::from_bytes(&private.to_bytes(Profile::Modern)).unwrap();

        assert_eq!(decoded, private);
    }

    #[test]
    fn json_roundtrip() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let decoded = PrivateKey::from_json(&private.to_json()).unwrap();

        assert_eq!(decoded, private);
    }

    #[test]
    fn legacy_formats_substitute_their_defaults() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        let mut format_0 = private.to_bytes(Profile::Legacy);
        format_0[1] = 0x00;
        let decoded = PrivateKey::from_bytes(&format_0).unwrap();
        assert_eq!(decoded.options().encryption_padding, Padding::Oaep);
        assert_eq!(decoded.options().signature_padding, Padding::Pkcs1);

        let format_1 = private.to_bytes(Profile::Legacy);
        let decoded = PrivateKey::from_bytes(&format_1).unwrap();
        assert_eq!(decoded.options().encryption_padding, Padding::Pkcs1);
        assert_eq!(decoded.options().signature_padding, Padding::Pkcs1);
    }

    #[test]
    fn unknown_format_is_a_format_error() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut bytes = private.to_bytes(Profile::Modern);
        bytes[0] = 0x00;
        bytes[1] = 0x2a;

        assert_eq!(PrivateKey::from_bytes(&bytes).unwrap_err(), Error::Format(42));
    }

    #[test]
    fn display_does_not_leak_key_material() {
        let private = PrivateKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

        assert_eq!(private.to_string(), "PrivateKey(2048 bits)");
    }
}
