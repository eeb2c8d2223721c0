//! Master-password key derivation.
//!
//! One fixed KDF for the whole system: PBKDF2 with an HMAC-SHA1 PRF,
//! 1,000 iterations, 32-byte output. Every vault file, master-key record
//! and export archive in existence was derived with exactly these
//! parameters, so they are constants, not configuration - changing them
//! would silently orphan all existing data. Interoperating implementations
//! must match them bit for bit.

use std::num::NonZeroU32;

use ring::pbkdf2;
use secrecy::SecretBox;
use zeroize::Zeroizing;

/// Length of the vault salt in bytes.
pub const SALT_LEN: usize = 32;

/// Length of the derived symmetric key in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Fixed PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: NonZeroU32 = NonZeroU32::new(1_000).unwrap();

/// PRF for PBKDF2. SHA-1 is weak as a hash but remains sound as an HMAC
/// PRF; it is pinned here for compatibility with existing archives.
static PBKDF2_PRF: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA1;

/// Derive the vault key from a master password and salt.
///
/// Deterministic and side-effect free: identical inputs produce identical
/// output on every platform. The password is consumed as raw UTF-8 bytes
/// with no Unicode normalization - normalizing would derive a different
/// key for archives created by other implementations of this format.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> SecretBox<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        PBKDF2_PRF,
        PBKDF2_ITERATIONS,
        salt,
        password.as_bytes(),
        &mut key[..],
    );
    SecretBox::new(Box::new(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("correct horse battery staple", &salt);
        let b = derive_key("correct horse battery staple", &salt);
        assert_eq!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn different_passwords_derive_different_keys() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("password-one", &salt);
        let b = derive_key("password-two", &salt);
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn different_salts_derive_different_keys() {
        let a = derive_key("same-password", &[1u8; SALT_LEN]);
        let b = derive_key("same-password", &[2u8; SALT_LEN]);
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn unicode_passwords_are_not_normalized() {
        let salt = [7u8; SALT_LEN];
        // Composed vs decomposed forms of "é" are distinct byte sequences
        // and must derive distinct keys (no NFC normalization).
        let composed = derive_key("caf\u{00e9}", &salt);
        let decomposed = derive_key("cafe\u{0301}", &salt);
        assert_ne!(composed.expose_secret(), decomposed.expose_secret());
    }
}
