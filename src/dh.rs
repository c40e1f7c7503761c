//! The DH asymmetric cryptosystem.
//!
//! DH keys do one thing: agree. A private key and a peer's public key
//! derive the same shared secret, returned as a ready-to-use
//! [`crate::SecretKey`]. Keys are exchanged for one agreement and
//! thrown away; their serialized form is an in-process identity, not a
//! persistence format (the provider has no DER for DH).

mod private_key;
mod public_key;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
