//! Default configuration values for RSA operations.

use crate::algorithms::{Cipher, Mode, Oneway, Padding};

#[cfg(not(feature = "legacy"))]
pub const ENCRYPTION_PADDING: Padding = Padding::Oaep;
#[cfg(feature = "legacy")]
pub const ENCRYPTION_PADDING: Padding = Padding::Pkcs1;

#[cfg(not(feature = "legacy"))]
pub const SIGNATURE_PADDING: Padding = Padding::Pss;
#[cfg(feature = "legacy")]
pub const SIGNATURE_PADDING: Padding = Padding::Pkcs1;

pub const ONEWAY: Oneway = Oneway::Sha256;
pub const ENVELOPE_CIPHER: Cipher = Cipher::Aes256;
pub const ENVELOPE_MODE: Mode = Mode::Cbc;

/// Configuration an RSA key applies to its operations.
///
/// Set once at construction (or substituted by the legacy decoder) and
/// used by every encrypt/decrypt/sign/verify/seal/open call on the key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Options {
    pub encryption_padding: Padding,
    pub signature_padding: Padding,
    pub oneway: Oneway,
    pub envelope_cipher: Cipher,
    pub envelope_mode: Mode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            encryption_padding: ENCRYPTION_PADDING,
            signature_padding: SIGNATURE_PADDING,
            oneway: ONEWAY,
            envelope_cipher: ENVELOPE_CIPHER,
            envelope_mode: ENVELOPE_MODE,
        }
    }
}

impl Options {
    #[must_use]
    pub fn with_encryption_padding(mut self, padding: Padding) -> Self {
        self.encryption_padding = padding;
        self
    }

    #[must_use]
    pub fn with_signature_padding(mut self, padding: Padding) -> Self {
        self.signature_padding = padding;
        self
    }

    #[must_use]
    pub fn with_oneway(mut self, oneway: Oneway) -> Self {
        self.oneway = oneway;
        self
    }

    #[must_use]
    pub fn with_envelope_cipher(mut self, cipher: Cipher, mode: Mode) -> Self {
        self.envelope_cipher = cipher;
        self.envelope_mode = mode;
        self
    }
}
