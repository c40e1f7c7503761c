use habanero::Error;
use habanero::rsa::{KeyPair, Seed};

#[test]
fn rotate_then_unrotate_yields_the_original_seed() {
    let pair = KeyPair::generate(2048).unwrap();
    let seed = Seed::random(2048).unwrap();
    assert_eq!(seed.size(), 256);

    let rotated = pair.private_key().rotate(&seed).unwrap();
    assert_eq!(rotated.size(), seed.size());
    assert_ne!(rotated, seed);

    let unrotated = pair.public_key().unrotate(&rotated).unwrap();
    assert_eq!(unrotated, seed);
}

#[test]
fn rotation_is_deterministic() {
    let pair = KeyPair::generate(2048).unwrap();
    let seed = Seed::random(2048).unwrap();

    let first = pair.private_key().rotate(&seed).unwrap();
    let second = pair.private_key().rotate(&seed).unwrap();

    assert_eq!(first, second);
}

#[test]
fn rotation_chains_and_unrotation_walks_back() {
    let pair = KeyPair::generate(2048).unwrap();
    let seed = Seed::random(2048).unwrap();

    let once = pair.private_key().rotate(&seed).unwrap();
    let twice = pair.private_key().rotate(&once).unwrap();
    assert_eq!(twice.size(), seed.size());

    let back_once = pair.public_key().unrotate(&twice).unwrap();
    assert_eq!(back_once, once);
    let back = pair.public_key().unrotate(&back_once).unwrap();
    assert_eq!(back, seed);
}

#[test]
fn a_mis_sized_seed_is_rejected() {
    let pair = KeyPair::generate(2048).unwrap();
    let seed = Seed::random(1024).unwrap();

    let err = pair.private_key().rotate(&seed).unwrap_err();

    assert_eq!(
        err,
        Error::SizeMismatch {
            expected: 256,
            actual: 128,
        }
    );
}

#[test]
fn a_key_pair_deduced_from_a_seed_is_deterministic() {
    let seed = Seed::random(512).unwrap();

    let first = KeyPair::from_seed(&seed).unwrap();
    let second = KeyPair::from_seed(&seed).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.private_key(), second.private_key());
    assert_eq!(first.length(), 512);
}

#[test]
fn deduced_key_pairs_from_distinct_seeds_differ() {
    let first = KeyPair::from_seed(&Seed::random(512).unwrap()).unwrap();
    let second = KeyPair::from_seed(&Seed::random(512).unwrap()).unwrap();

    assert_ne!(first, second);
}

#[test]
fn a_deduced_key_pair_actually_works() {
    let seed = Seed::random(768).unwrap();
    let pair = KeyPair::from_seed(&seed).unwrap();

    let signature = pair.private_key().sign(b"hello, world!").unwrap();
    assert!(pair.public_key().verify(&signature, b"hello, world!").unwrap());

    let sealed = pair.public_key().seal(b"Attack at dawn").unwrap();
    assert_eq!(
        pair.private_key().open(&sealed).unwrap(),
        b"Attack at dawn"
    );
}

#[test]
fn rotated_seeds_derive_unrelated_key_pairs() {
    let pair = KeyPair::generate(512).unwrap();
    let seed = Seed::random(512).unwrap();

    let rotated = pair.private_key().rotate(&seed).unwrap();

    let original = KeyPair::from_seed(&seed).unwrap();
    let derived = KeyPair::from_seed(&rotated).unwrap();

    assert_ne!(original, derived);
}
