//! Asymmetric primitive dispatch.
//!
//! Encrypt/decrypt wrap at most one modulus worth of bytes; larger
//! payloads go through the envelope. Sign/verify stream the plain text
//! through a digest-sign context. Rotate/unrotate are raw (unpadded) RSA
//! private/public applications over modulus-sized buffers, used as a
//! deterministic derivation step.
//!
//! The context-configuration hooks of the provider (padding, PSS salt
//! length) are carried by [`ApplyConfig`] and applied between context
//! initialization and the first update.

use std::io::Read;

use openssl::hash::MessageDigest;
use openssl::pkey::{HasPrivate, HasPublic, PKeyRef};
use openssl::rsa::RsaRef;
use openssl::sign::{RsaPssSaltlen, Signer, Verifier};

use crate::algorithms::Padding;
use crate::error::{Error, Result};
use crate::provider;
use crate::raw::{STREAM_BLOCK_SIZE, read_block};

/// Context configuration applied at the well-defined point between
/// initialization and update.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ApplyConfig {
    /// RSA padding for the operation; `None` for cryptosystems that do
    /// not take one (DSA, DH).
    pub padding: Option<Padding>,
}

impl ApplyConfig {
    #[must_use]
    pub fn with_padding(padding: Padding) -> Self {
        Self {
            padding: Some(padding),
        }
    }
}

/// Encrypt (wrap) a plain text with the public key.
///
/// The plain text cannot be larger than the key's modulus, minus the
/// padding overhead; that is the caller's contract.
///
/// # Errors
///
/// Errors if the provider refuses the operation (input too large for the
/// modulus, unsupported padding).
pub fn encrypt<T: HasPublic>(key: &RsaRef<T>, padding: Padding, plain: &[u8]) -> Result<Vec<u8>> {
    provider::require();

    let size = key.size() as usize;
    debug_assert!(plain.len() <= size);

    // Query size, allocate, apply, shrink.
    let mut code = vec![0u8; size];
    let written = key.public_encrypt(plain, &mut code, padding.resolve())?;
    code.truncate(written);

    Ok(code)
}

/// Decrypt (unwrap) a code with the private key.
///
/// # Errors
///
/// Errors if the code does not decrypt under this key and padding.
pub fn decrypt<T: HasPrivate>(key: &RsaRef<T>, padding: Padding, code: &[u8]) -> Result<Vec<u8>> {
    provider::require();

    let mut plain = vec![0u8; key.size() as usize];
    let written = key.private_decrypt(code, &mut plain, padding.resolve())?;
    plain.truncate(written);

    Ok(plain)
}

/// Sign a stream of plain bytes.
///
/// The signature's length is bounded by the key's size in bytes, and
/// equals it for RSA.
///
/// # Errors
///
/// Errors if the signature context fails or the input stream breaks
/// mid-read.
pub fn sign<T: HasPrivate>(
    key: &PKeyRef<T>,
    oneway: MessageDigest,
    config: ApplyConfig,
    plain: &mut dyn Read,
) -> Result<Vec<u8>> {
    provider::require();

    let mut context = Signer::new(oneway, key)?;
    configure_signer(&mut context, config)?;

    let mut input = vec![0u8; STREAM_BLOCK_SIZE];
    loop {
        let read = read_block(plain, &mut input)?;
        if read == 0 {
            break;
        }
        context.update(&input[..read])?;
    }

    let signature = context.sign_to_vec()?;

    Ok(signature)
}

/// Whether the signature matches the stream of plain bytes.
///
/// A mismatching signature is `Ok(false)`; only a context or stream
/// failure is an error.
///
/// # Errors
///
/// Errors with [`Error::Verify`] if the verify context itself fails, and
/// with [`Error::Io`] if the input stream breaks mid-read.
pub fn verify<T: HasPublic>(
    key: &PKeyRef<T>,
    oneway: MessageDigest,
    config: ApplyConfig,
    signature: &[u8],
    plain: &mut dyn Read,
) -> Result<bool> {
    provider::require();

    let mut context = Verifier::new(oneway, key).map_err(|e| Error::Verify(e.to_string()))?;
    configure_verifier(&mut context, config)?;

    let mut input = vec![0u8; STREAM_BLOCK_SIZE];
    loop {
        let read = read_block(plain, &mut input)?;
        if read == 0 {
            break;
        }
        context
            .update(&input[..read])
            .map_err(|e| Error::Verify(e.to_string()))?;
    }

    // The provider reports a mismatch either as a clean false or as a
    // padding-check error; both mean "does not match".
    Ok(context.verify(signature).unwrap_or(false))
}

/// Derive a shared secret from our private key and the peer's public key.
///
/// # Errors
///
/// Errors if the two keys do not share parameters, or the derive context
/// fails.
pub fn agree<T: HasPrivate, U: HasPublic>(
    own: &PKeyRef<T>,
    peer: &PKeyRef<U>,
) -> Result<Vec<u8>> {
    provider::require();

    let mut context = openssl::derive::Deriver::new(own)?;
    context.set_peer(peer)?;

    let secret = context.derive_to_vec()?;

    Ok(secret)
}

/// Rotate a modulus-sized seed under the private key.
///
/// This is a raw (unpadded) private-key application: deterministic, and
/// exactly invertible by [`unrotate`] under the public key.
///
/// # Errors
///
/// Errors with [`Error::SizeMismatch`] if the seed is not exactly
/// modulus-sized. If the seed were larger, it would have to be enveloped
/// and would grow at every derivation; if it were smaller, raw RSA would
/// be open to textbook attacks.
pub fn rotate<T: HasPrivate>(key: &RsaRef<T>, seed: &[u8]) -> Result<Vec<u8>> {
    provider::require();

    let size = key.size() as usize;
    if seed.len() != size {
        return Err(Error::SizeMismatch {
            expected: size,
            actual: seed.len(),
        });
    }

    let mut rotated = vec![0u8; size];
    let written = key.private_encrypt(seed, &mut rotated, openssl::rsa::Padding::NONE)?;
    rotated.truncate(written);

    // The seed must not grow over time.
    debug_assert_eq!(rotated.len(), size);

    Ok(rotated)
}

/// Unrotate a modulus-sized seed under the public key.
///
/// Inverse of [`rotate`]; a recover-style public-key application.
///
/// # Errors
///
/// Errors with [`Error::SizeMismatch`] if the seed is not exactly
/// modulus-sized.
pub fn unrotate<T: HasPublic>(key: &RsaRef<T>, seed: &[u8]) -> Result<Vec<u8>> {
    provider::require();

    let size = key.size() as usize;
    if seed.len() != size {
        return Err(Error::SizeMismatch {
            expected: size,
            actual: seed.len(),
        });
    }

    let mut unrotated = vec![0u8; size];
    let written = key.public_decrypt(seed, &mut unrotated, openssl::rsa::Padding::NONE)?;
    unrotated.truncate(written);

    debug_assert_eq!(unrotated.len(), size);

    Ok(unrotated)
}

fn configure_signer(context: &mut Signer<'_>, config: ApplyConfig) -> Result<()> {
    if let Some(padding) = config.padding {
        context.set_rsa_padding(padding.resolve())?;
        if padding == Padding::Pss {
            context.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
        }
    }
    Ok(())
}

fn configure_verifier(context: &mut Verifier<'_>, config: ApplyConfig) -> Result<()> {
    if let Some(padding) = config.padding {
        context
            .set_rsa_padding(padding.resolve())
            .map_err(|e| Error::Verify(e.to_string()))?;
        if padding == Padding::Pss {
            context
                .set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)
                .map_err(|e| Error::Verify(e.to_string()))?;
        }
    }
    Ok(())
}
