//! Algorithm catalogs and their resolution to provider handles.
//!
//! Every algorithm this crate speaks is a value enum with a stable numeric
//! discriminant (used by the binary and JSON codecs). Resolution goes
//! through provider NID lookup, so whether an algorithm is actually
//! available is decided by the provider build this crate is linked
//! against; a miss surfaces as [`Error::UnknownAlgorithm`].

use std::fmt;

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::symm;

use crate::error::{Error, Result};

/// A cryptographic hash algorithm.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Oneway {
    Md5 = 0,
    Sha = 1,
    Sha1 = 2,
    Sha224 = 3,
    Sha256 = 4,
    Sha384 = 5,
    Sha512 = 6,
}

impl Oneway {
    /// Resolve to a provider digest handle.
    ///
    /// # Errors
    ///
    /// Errors if the provider build does not ship the digest (SHA-0 for
    /// instance is long gone from modern builds).
    pub fn resolve(self) -> Result<MessageDigest> {
        let nid = match self {
            Self::Md5 => Nid::MD5,
            Self::Sha => Nid::SHA,
            Self::Sha1 => Nid::SHA1,
            Self::Sha224 => Nid::SHA224,
            Self::Sha256 => Nid::SHA256,
            Self::Sha384 => Nid::SHA384,
            Self::Sha512 => Nid::SHA512,
        };
        MessageDigest::from_nid(nid).ok_or_else(|| Error::UnknownAlgorithm(self.to_string()))
    }

    pub(crate) fn from_discriminant(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::Md5,
            1 => Self::Sha,
            2 => Self::Sha1,
            3 => Self::Sha224,
            4 => Self::Sha256,
            5 => Self::Sha384,
            6 => Self::Sha512,
            unknown => {
                return Err(Error::Serialization(format!(
                    "unknown oneway discriminant '{unknown}'"
                )));
            }
        })
    }
}

impl fmt::Display for Oneway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Md5 => "md5",
            Self::Sha => "sha",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        };
        write!(f, "{name}")
    }
}

/// A symmetric block cipher family.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Cipher {
    Des = 0,
    Des2 = 1,
    Des3 = 2,
    Desx = 3,
    Idea = 4,
    Rc2 = 5,
    Blowfish = 6,
    Cast5 = 7,
    Aes128 = 8,
    Aes192 = 9,
    Aes256 = 10,
}

impl Cipher {
    pub(crate) fn from_discriminant(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::Des,
            1 => Self::Des2,
            2 => Self::Des3,
            3 => Self::Desx,
            4 => Self::Idea,
            5 => Self::Rc2,
            6 => Self::Blowfish,
            7 => Self::Cast5,
            8 => Self::Aes128,
            9 => Self::Aes192,
            10 => Self::Aes256,
            unknown => {
                return Err(Error::Serialization(format!(
                    "unknown cipher discriminant '{unknown}'"
                )));
            }
        })
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Des => "des",
            Self::Des2 => "des-ede",
            Self::Des3 => "des-ede3",
            Self::Desx => "desx",
            Self::Idea => "idea",
            Self::Rc2 => "rc2",
            Self::Blowfish => "blowfish",
            Self::Cast5 => "cast5",
            Self::Aes128 => "aes-128",
            Self::Aes192 => "aes-192",
            Self::Aes256 => "aes-256",
        };
        write!(f, "{name}")
    }
}

/// A block cipher chaining mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Mode {
    None = 0,
    Cbc = 1,
    Ecb = 2,
    Cfb = 3,
    Ofb = 4,
}

impl Mode {
    pub(crate) fn from_discriminant(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::None,
            1 => Self::Cbc,
            2 => Self::Ecb,
            3 => Self::Cfb,
            4 => Self::Ofb,
            unknown => {
                return Err(Error::Serialization(format!(
                    "unknown mode discriminant '{unknown}'"
                )));
            }
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Cbc => "cbc",
            Self::Ecb => "ecb",
            Self::Cfb => "cfb",
            Self::Ofb => "ofb",
        };
        write!(f, "{name}")
    }
}

/// Resolve a `(cipher, mode)` pair to a provider cipher handle.
///
/// # Errors
///
/// Errors on combinations the provider has no algorithm for (e.g. DESX
/// only exists in CBC mode, and no block cipher runs without a mode).
pub fn resolve(cipher: Cipher, mode: Mode) -> Result<symm::Cipher> {
    use Cipher as C;
    use Mode as M;

    let nid = match (cipher, mode) {
        (C::Des, M::Cbc) => Nid::DES_CBC,
        (C::Des, M::Ecb) => Nid::DES_ECB,
        (C::Des, M::Cfb) => Nid::DES_CFB64,
        (C::Des, M::Ofb) => Nid::DES_OFB64,
        (C::Des2, M::Cbc) => Nid::DES_EDE_CBC,
        (C::Des2, M::Ecb) => Nid::DES_EDE_ECB,
        (C::Des2, M::Cfb) => Nid::DES_EDE_CFB64,
        (C::Des2, M::Ofb) => Nid::DES_EDE_OFB64,
        (C::Des3, M::Cbc) => Nid::DES_EDE3_CBC,
        (C::Des3, M::Ecb) => Nid::DES_EDE3_ECB,
        (C::Des3, M::Cfb) => Nid::DES_EDE3_CFB64,
        (C::Des3, M::Ofb) => Nid::DES_EDE3_OFB64,
        (C::Desx, M::Cbc) => Nid::DESX_CBC,
        (C::Idea, M::Cbc) => Nid::IDEA_CBC,
        (C::Idea, M::Ecb) => Nid::IDEA_ECB,
        (C::Idea, M::Cfb) => Nid::IDEA_CFB64,
        (C::Idea, M::Ofb) => Nid::IDEA_OFB64,
        (C::Rc2, M::Cbc) => Nid::RC2_CBC,
        (C::Rc2, M::Ecb) => Nid::RC2_ECB,
        (C::Rc2, M::Cfb) => Nid::RC2_CFB64,
        (C::Rc2, M::Ofb) => Nid::RC2_OFB64,
        (C::Blowfish, M::Cbc) => Nid::BF_CBC,
        (C::Blowfish, M::Ecb) => Nid::BF_ECB,
        (C::Blowfish, M::Cfb) => Nid::BF_CFB64,
        (C::Blowfish, M::Ofb) => Nid::BF_OFB64,
        (C::Cast5, M::Cbc) => Nid::CAST5_CBC,
        (C::Cast5, M::Ecb) => Nid::CAST5_ECB,
        (C::Cast5, M::Cfb) => Nid::CAST5_CFB64,
        (C::Cast5, M::Ofb) => Nid::CAST5_OFB64,
        (C::Aes128, M::Cbc) => Nid::AES_128_CBC,
        (C::Aes128, M::Ecb) => Nid::AES_128_ECB,
        (C::Aes128, M::Cfb) => Nid::AES_128_CFB128,
        (C::Aes128, M::Ofb) => Nid::AES_128_OFB128,
        (C::Aes192, M::Cbc) => Nid::AES_192_CBC,
        (C::Aes192, M::Ecb) => Nid::AES_192_ECB,
        (C::Aes192, M::Cfb) => Nid::AES_192_CFB128,
        (C::Aes192, M::Ofb) => Nid::AES_192_OFB128,
        (C::Aes256, M::Cbc) => Nid::AES_256_CBC,
        (C::Aes256, M::Ecb) => Nid::AES_256_ECB,
        (C::Aes256, M::Cfb) => Nid::AES_256_CFB128,
        (C::Aes256, M::Ofb) => Nid::AES_256_OFB128,
        (cipher, mode) => {
            return Err(Error::UnknownAlgorithm(format!("{cipher}-{mode}")));
        }
    };

    symm::Cipher::from_nid(nid).ok_or_else(|| Error::UnknownAlgorithm(format!("{cipher}-{mode}")))
}

/// An RSA padding scheme.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Padding {
    None = 0,
    Pkcs1 = 1,
    Oaep = 2,
    Pss = 3,
}

impl Padding {
    /// The provider constant for this padding.
    #[must_use]
    pub fn resolve(self) -> openssl::rsa::Padding {
        match self {
            Self::None => openssl::rsa::Padding::NONE,
            Self::Pkcs1 => openssl::rsa::Padding::PKCS1,
            Self::Oaep => openssl::rsa::Padding::PKCS1_OAEP,
            Self::Pss => openssl::rsa::Padding::PKCS1_PSS,
        }
    }

    pub(crate) fn from_discriminant(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::None,
            1 => Self::Pkcs1,
            2 => Self::Oaep,
            3 => Self::Pss,
            unknown => {
                return Err(Error::Serialization(format!(
                    "unknown padding discriminant '{unknown}'"
                )));
            }
        })
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Pkcs1 => "pkcs1",
            Self::Oaep => "oaep",
            Self::Pss => "pss",
        };
        write!(f, "{name}")
    }
}

/// An asymmetric cryptosystem.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Cryptosystem {
    Rsa = 0,
    Dsa = 1,
    Dh = 2,
}

impl Cryptosystem {
    pub(crate) fn from_discriminant(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::Rsa,
            1 => Self::Dsa,
            2 => Self::Dh,
            unknown => {
                return Err(Error::Serialization(format!(
                    "unknown cryptosystem discriminant '{unknown}'"
                )));
            }
        })
    }
}

impl fmt::Display for Cryptosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rsa => "rsa",
            Self::Dsa => "dsa",
            Self::Dh => "dh",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oneway_resolves_to_digest_of_natural_size() {
        assert_eq!(Oneway::Md5.resolve().unwrap().size(), 16);
        assert_eq!(Oneway::Sha1.resolve().unwrap().size(), 20);
        assert_eq!(Oneway::Sha224.resolve().unwrap().size(), 28);
        assert_eq!(Oneway::Sha256.resolve().unwrap().size(), 32);
        assert_eq!(Oneway::Sha384.resolve().unwrap().size(), 48);
        assert_eq!(Oneway::Sha512.resolve().unwrap().size(), 64);
    }

    #[test]
    fn cipher_mode_resolves() {
        let cipher = resolve(Cipher::Aes256, Mode::Cbc).unwrap();

        assert_eq!(cipher.key_len(), 32);
        assert_eq!(cipher.block_size(), 16);
    }

    #[test]
    fn modeless_block_cipher_is_unknown() {
        let err = match resolve(Cipher::Aes256, Mode::None) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };

        assert!(matches!(err, Error::UnknownAlgorithm(_)));
    }

    #[test]
    fn desx_only_knows_cbc() {
        assert!(resolve(Cipher::Desx, Mode::Cbc).is_ok());
        assert!(resolve(Cipher::Desx, Mode::Ecb).is_err());
        assert!(resolve(Cipher::Desx, Mode::Ofb).is_err());
    }

    #[test]
    fn discriminants_round_trip() {
        for oneway in [
            Oneway::Md5,
            Oneway::Sha,
            Oneway::Sha1,
            Oneway::Sha224,
            Oneway::Sha256,
            Oneway::Sha384,
            Oneway::Sha512,
        ] {
            assert_eq!(Oneway::from_discriminant(oneway as u8).unwrap(), oneway);
        }
        for padding in [Padding::None, Padding::Pkcs1, Padding::Oaep, Padding::Pss] {
            assert_eq!(Padding::from_discriminant(padding as u8).unwrap(), padding);
        }
    }

    #[test]
    fn unknown_discriminant_is_an_error() {
        assert!(Oneway::from_discriminant(200).is_err());
        assert!(Cipher::from_discriminant(200).is_err());
        assert!(Cryptosystem::from_discriminant(200).is_err());
    }
}
