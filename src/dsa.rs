//! The DSA asymmetric cryptosystem.
//!
//! DSA keys sign and verify; there is no encryption. Every key carries
//! the digest algorithm its signatures are computed with.

pub mod pem;

mod key_pair;
mod private_key;
mod public_key;

pub use key_pair::KeyPair;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
