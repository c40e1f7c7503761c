//! Rotation seeds.

use std::fmt;
use std::hash::{Hash, Hasher};

use secrecy::zeroize::Zeroizing;
use serde_json::json;

use crate::error::{Error, Result};
use crate::random;
use crate::serialization::{FORMAT_0, FORMAT_1, FORMAT_2, Profile, json, wire};

/// A modulus-sized byte sequence that, rotated under an RSA key,
/// deterministically produces another seed of the same size — the basis
/// for deriving further key material.
///
/// A seed carries the bit length of the keys it may be rotated under;
/// its buffer is exactly that many bits. The buffer is zeroed on
/// release.
#[derive(Clone)]
pub struct Seed {
    buffer: Zeroizing<Vec<u8>>,
    length: u32,
}

impl Seed {
    /// Wrap an existing buffer as a seed for `length`-bit keys.
    ///
    /// # Errors
    ///
    /// Errors if the buffer is not `length` bits long.
    pub fn new(buffer: Vec<u8>, length: u32) -> Result<Self> {
        let expected = (length as usize).div_ceil(8);
        if buffer.len() != expected || expected == 0 {
            return Err(Error::SizeMismatch {
                expected,
                actual: buffer.len(),
            });
        }

        Ok(Self {
            buffer: Zeroizing::new(buffer),
            length,
        })
    }

    /// Draw a random seed for `length`-bit keys.
    ///
    /// The top bit is cleared so the seed's numeric value stays below
    /// any modulus of the same length, as raw RSA demands.
    ///
    /// # Errors
    ///
    /// Errors if the provider RNG fails, or `length` is zero.
    pub fn random(length: u32) -> Result<Self> {
        let size = (length as usize).div_ceil(8);
        if size == 0 {
            return Err(Error::SizeMismatch {
                expected: 1,
                actual: 0,
            });
        }

        let mut buffer = random::bytes(size)?;
        buffer[0] &= 0x7f;

        Self::new(buffer, length)
    }

    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The seed's length in bits.
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// The seed's size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Serialize with the binary codec.
    #[must_use]
    pub fn to_bytes(&self, profile: Profile) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_u16(&mut out, profile.format());
        wire::put_u32(&mut out, self.length);
        wire::put_bytes(&mut out, &self.buffer);
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
        let length = reader.u32()?;
        let buffer = reader.bytes()?.to_vec();
        reader.finish()?;

        Self::new(buffer, length)
    }

    /// Serialize as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        json!({
            "type": "rsa.seed",
            "format": FORMAT_2,
            "length": self.length,
            "buffer": json::buffer(&self.buffer),
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
        match json::check_schema(&object, "rsa.seed")? {
            FORMAT_0 | FORMAT_1 | FORMAT_2 => {}
            unknown => return Err(Error::Format(unknown)),
        }

        let length = u32::try_from(json::get_u64(&object, "length")?)
            .map_err(|_| Error::Serialization("seed length out of range".to_string()))?;

        Self::new(json::get_buffer(&object, "buffer")?, length)
    }
}

impl PartialEq for Seed {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && *self.buffer == *other.buffer
    }
}

impl Eq for Seed {}

impl Hash for Seed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (*self.buffer).hash(state);
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the seed itself.
        write!(f, "Seed({} bits)", self.length)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
