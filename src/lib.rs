//! Typed keys, streaming ciphers, and envelope encryption over OpenSSL.
//!
//! The primitives themselves are delegated to the provider; this crate
//! is the disciplined layering above them:
//!
//! - typed RSA/DSA/DH keys with lifecycle, equality and serialization
//!   (DER, PEM with passphrase, versioned binary, JSON);
//! - streaming digest/HMAC/cipher operations over arbitrary `Read`/
//!   `Write` streams;
//! - the salted symmetric stream codec, wire-compatible with
//!   `openssl enc -salted`;
//! - envelope encryption for payloads larger than a key's modulus;
//! - deterministic key derivation from modulus-sized seeds (rotation).

pub mod algorithms;
pub mod dh;
pub mod dsa;
pub mod envelope;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod pem;
pub mod provider;
pub mod random;
pub mod raw;
pub mod rsa;
pub mod secret_key;
pub mod serialization;

pub use algorithms::{Cipher, Cryptosystem, Mode, Oneway, Padding};
pub use error::{Error, Result};
pub use secret_key::SecretKey;
pub use serialization::Profile;
