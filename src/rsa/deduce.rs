//! Deterministic derivation of an RSA key from a seed.
//!
//! The seed drives a deterministic byte generator (SHA-512 over
//! seed ‖ domain ‖ counter); each prime is found by walking odd
//! candidates from a generator-derived starting point until one passes
//! the provider's primality test. The same seed therefore always yields
//! the same key, on any machine.

use openssl::bn::{BigNum, BigNumContext, BigNumRef};
use openssl::hash::{MessageDigest, hash};
use openssl::pkey::Private;
use openssl::rsa::{Rsa, RsaPrivateKeyBuilder};
use secrecy::zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::provider;

use super::Seed;

const PUBLIC_EXPONENT: u32 = 65_537;

/// Miller-Rabin rounds; enough to make a false positive as unlikely as
/// a provider-generated prime being composite.
const PRIME_CHECKS: i32 = 64;

/// Deduce the RSA private key a seed stands for.
pub(crate) fn rsa(seed: &Seed) -> Result<Rsa<Private>> {
    provider::require();

    let length = seed.length();
    if length < 512 || length % 16 != 0 {
        return Err(Error::InvalidKey(format!(
            "cannot deduce a key pair from a {length}-bit seed"
        )));
    }
    let half = length / 2;

    let mut ctx = BigNumContext::new()?;
    let e = BigNum::from_u32(PUBLIC_EXPONENT)?;

    let p = derive_prime(seed.buffer(), 1, half, &e, &mut ctx)?;
    let mut domain = 2u8;
    let q = loop {
        let q = derive_prime(seed.buffer(), domain, half, &e, &mut ctx)?;
        if q != p {
            break q;
        }
        domain += 1;
    };

    let mut n = BigNum::new()?;
    n.checked_mul(&p, &q, &mut ctx)?;

    let one = BigNum::from_u32(1)?;
    let mut p1 = BigNum::new()?;
    p1.checked_sub(&p, &one)?;
    let mut q1 = BigNum::new()?;
    q1.checked_sub(&q, &one)?;

    // d = e^-1 mod lcm(p - 1, q - 1)
    let mut g = BigNum::new()?;
    g.gcd(&p1, &q1, &mut ctx)?;
    let mut product = BigNum::new()?;
    product.checked_mul(&p1, &q1, &mut ctx)?;
    let mut lcm = BigNum::new()?;
    lcm.checked_div(&product, &g, &mut ctx)?;
    let mut d = BigNum::new()?;
    d.mod_inverse(&e, &lcm, &mut ctx)?;

    let mut dmp1 = BigNum::new()?;
    dmp1.checked_rem(&d, &p1, &mut ctx)?;
    let mut dmq1 = BigNum::new()?;
    dmq1.checked_rem(&d, &q1, &mut ctx)?;
    let mut iqmp = BigNum::new()?;
    iqmp.mod_inverse(&q, &p, &mut ctx)?;

    let key = RsaPrivateKeyBuilder::new(n, e, d)?
        .set_factors(p, q)?
        .set_crt_params(dmp1, dmq1, iqmp)?
        .build();

    Ok(key)
}

/// Find the prime the seed designates for the given domain.
fn derive_prime(
    seed: &[u8],
    domain: u8,
    bits: u32,
    e: &BigNumRef,
    ctx: &mut BigNumContext,
) -> Result<BigNum> {
    let size = (bits / 8) as usize;
    let mut material = Zeroizing::new(expand(seed, domain, size)?);

    // The two top bits keep the product of two primes at full length;
    // the low bit starts the walk on an odd candidate.
    material[0] |= 0b1100_0000;
    let last = material.len() - 1;
    material[last] |= 0b0000_0001;

    let mut candidate = BigNum::from_slice(&material)?;
    let one = BigNum::from_u32(1)?;

    loop {
        if candidate.is_prime_fasttest(PRIME_CHECKS, ctx, true)? {
            // The public exponent must be invertible modulo
            // candidate - 1.
            let mut rem = BigNum::new()?;
            rem.checked_rem(&candidate, e, ctx)?;
            if rem != one {
                return Ok(candidate);
            }
        }
        candidate.add_word(2)?;
    }
}

/// Deterministically expand the seed into `size` bytes.
fn expand(seed: &[u8], domain: u8, size: usize) -> Result<Vec<u8>> {
    let mut material = Vec::with_capacity(size + 64);
    let mut counter: u32 = 0;

    while material.len() < size {
        let mut block = Vec::with_capacity(seed.len() + 5);
        block.extend_from_slice(seed);
        block.push(domain);
        block.extend_from_slice(&counter.to_be_bytes());

        let digest = hash(MessageDigest::sha512(), &block)?;
        material.extend_from_slice(&digest);

        counter += 1;
    }

    material.truncate(size);
    Ok(material)
}
