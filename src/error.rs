use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The requested cipher, digest or padding is not supported by the
    /// provider this crate was linked against.
    UnknownAlgorithm(String),
    /// The provider returned an error; carries the provider's error string.
    Provider(String),
    /// Construction yielded a key failing structural checks, or the two
    /// halves of a key pair disagree.
    InvalidKey(String),
    /// A buffer does not have the size an operation demands (e.g. a seed
    /// that is not modulus-sized).
    SizeMismatch { expected: usize, actual: usize },
    /// The input or output stream failed mid-operation.
    Io(String),
    /// A salted stream does not start with the `Salted__` magic.
    MissingSalt,
    /// Wrong passphrase or corrupted ciphertext.
    Decryption,
    /// The derived symmetric key exceeds the maximum the cipher accepts.
    KeyTooLarge,
    /// Signature verification failed at the provider level (distinct from
    /// a clean "does not match").
    Verify(String),
    /// Malformed DER, JSON or binary input.
    Serialization(String),
    /// Unknown serialization format discriminant.
    Format(u16),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(what) => {
                write!(f, "Algorithm '{what}' is not supported by this build.")
            }
            Self::Provider(reason) => write!(f, "Provider error: {reason}"),
            Self::InvalidKey(reason) => write!(f, "Invalid key: {reason}"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "Size mismatch: expected {expected} bytes, got {actual}.")
            }
            Self::Io(reason) => write!(f, "Could not read or write stream: {reason}"),
            Self::MissingSalt => {
                write!(f, "The input was produced without any, or an invalid, salt.")
            }
            Self::Decryption => write!(
                f,
                "\
Could not decrypt input.
You are likely using the wrong secret or passphrase, or the data is corrupted."
            ),
            Self::KeyTooLarge => write!(f, "The derived key size is too large."),
            Self::Verify(reason) => write!(f, "Could not verify the signature: {reason}"),
            Self::Serialization(reason) => write!(f, "Could not decode input: {reason}"),
            Self::Format(format) => write!(f, "Unknown serialization format '{format}'."),
        }
    }
}

impl std::error::Error for Error {}

impl From<openssl::error::ErrorStack> for Error {
    /// Translate a provider failure, keeping its error string.
    fn from(stack: openssl::error::ErrorStack) -> Self {
        Self::Provider(stack.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_mentions_both_sizes() {
        let err = Error::SizeMismatch {
            expected: 256,
            actual: 32,
        };

        let message = err.to_string();

        assert!(message.contains("256"));
        assert!(message.contains("32"));
    }

    #[test]
    fn format_mentions_discriminant() {
        let err = Error::Format(42);

        assert!(err.to_string().contains("42"));
    }
}
