//! Non-secret identifier for the session key.
//!
//! Startup logs print this so operators can confirm that every replica
//! signs cookies with the same key without the key itself leaking.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Digest bytes kept; the hex form is twice as long.
const FINGERPRINT_BYTES: usize = 8;

/// Hex prefix of the SHA-256 digest of the key's signing half.
///
/// ```rust
/// use actix_web::cookie::Key;
/// use learning_backend::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    digest
        .get(..FINGERPRINT_BYTES)
        .map(hex::encode)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn same_material_gives_same_fingerprint() {
        let first = Key::derive_from(&[7_u8; 64]);
        let second = Key::derive_from(&[7_u8; 64]);
        assert_eq!(key_fingerprint(&first), key_fingerprint(&second));
    }

    #[rstest]
    fn fingerprints_are_short_lowercase_hex() {
        let fp = key_fingerprint(&Key::generate());
        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[rstest]
    fn distinct_keys_are_distinguishable() {
        let a = Key::derive_from(&[b'a'; 64]);
        let b = Key::derive_from(&[b'b'; 64]);
        assert_ne!(key_fingerprint(&a), key_fingerprint(&b));
    }
}
