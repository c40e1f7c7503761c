//! Process-wide provider setup.
//!
//! The first call to any operation initializes the provider exactly once:
//! algorithm tables are registered and the RNG pools are seeded by the
//! provider itself. There is no teardown; the provider cleans up at
//! process exit.

use std::sync::Once;

static INIT: Once = Once::new();

/// Make sure the cryptographic provider is set up.
///
/// Idempotent and thread-safe; every entry point of the raw layer calls
/// this before touching provider state.
pub fn require() {
    INIT.call_once(openssl::init);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_is_idempotent() {
        require();
        require();
    }
}
