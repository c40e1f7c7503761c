//! The RSA asymmetric cryptosystem.
//!
//! Public keys encrypt, seal and verify; private keys decrypt, open and
//! sign. Payloads larger than the modulus go through the envelope
//! (`seal`/`open`). A modulus-sized [`Seed`] can be rotated under a
//! private key — a deterministic, invertible derivation step — and a
//! whole key pair can be deduced from a seed.

pub mod defaults;
pub mod pem;

mod deduce;
mod key_pair;
mod private_key;
mod public_key;
mod seed;

pub use defaults::Options;
pub use key_pair::KeyPair;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use seed::Seed;
