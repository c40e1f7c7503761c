mod utils;

use std::io::Cursor;

use habanero::{Cipher, Error, Mode, Oneway, Profile, SecretKey};

use utils::payload;

#[test]
fn aes256_cbc_roundtrip_with_a_known_secret() {
    // 0x00 0x01 ... 0x1f
    let secret: Vec<u8> = (0u8..32).collect();
    let key = SecretKey::new(secret, Cipher::Aes256, Mode::Cbc, Oneway::Sha256);

    let code = key.encipher(b"Attack at dawn").unwrap();

    // The salted magic, literally.
    assert_eq!(
        &code[..8],
        &[0x53, 0x61, 0x6c, 0x74, 0x65, 0x64, 0x5f, 0x5f]
    );

    let plain = key.decipher(&code).unwrap();
    assert_eq!(plain, b"Attack at dawn");
}

#[test]
fn two_encipherments_of_the_same_plain_differ() {
    // The salt is drawn fresh every time.
    let key = SecretKey::generate(256).unwrap();

    let first = key.encipher(b"Attack at dawn").unwrap();
    let second = key.encipher(b"Attack at dawn").unwrap();

    assert_ne!(first, second);
}

#[test]
fn roundtrip_across_cipher_configurations() {
    // Restricted to what modern provider builds still ship by default
    // (Blowfish, IDEA, CAST5 and friends moved to the legacy provider).
    let configurations = [
        (Cipher::Aes128, Mode::Cbc, Oneway::Sha256),
        (Cipher::Aes192, Mode::Ecb, Oneway::Sha512),
        (Cipher::Aes256, Mode::Ofb, Oneway::Sha1),
        (Cipher::Des3, Mode::Cbc, Oneway::Md5),
    ];
    let plain = payload(1_000);

    for (cipher, mode, oneway) in configurations {
        let key = SecretKey::new(b"don't tell anyone".to_vec(), cipher, mode, oneway);

        let code = key.encipher(&plain).unwrap();
        let decoded = key.decipher(&code).unwrap();

        assert_eq!(decoded, plain, "{cipher}-{mode} with {oneway}");
    }
}

#[test]
fn streaming_roundtrip_larger_than_a_stream_block() {
    // Two full 512 KiB blocks plus change.
    let plain = payload(2 * 524_288 + 12_345);
    let key = SecretKey::generate(256).unwrap();

    let mut code = Vec::new();
    key.encipher_stream(&mut Cursor::new(&plain), &mut code)
        .unwrap();

    let mut decoded = Vec::new();
    key.decipher_stream(&mut Cursor::new(&code), &mut decoded)
        .unwrap();

    assert_eq!(decoded, plain);
}

#[test]
fn empty_plain_roundtrips() {
    let key = SecretKey::generate(256).unwrap();

    let code = key.encipher(b"").unwrap();
    // Magic, salt, and one padding block.
    assert!(code.len() >= 16);

    assert_eq!(key.decipher(&code).unwrap(), b"");
}

#[test]
fn unsalted_input_is_rejected() {
    let key = SecretKey::generate(256).unwrap();

    let err = key.decipher(b"clearly not a salted stream").unwrap_err();

    assert_eq!(err, Error::MissingSalt);
}

#[test]
fn secret_key_roundtrips_through_serialization() {
    let key = SecretKey::generate(256).unwrap();

    let code = key.encipher(b"Attack at dawn").unwrap();

    let revived = SecretKey::from_bytes(&key.to_bytes(Profile::Modern)).unwrap();
    assert_eq!(revived.decipher(&code).unwrap(), b"Attack at dawn");

    let revived = SecretKey::from_json(&key.to_json()).unwrap();
    assert_eq!(revived.decipher(&code).unwrap(), b"Attack at dawn");
}
