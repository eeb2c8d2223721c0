//! Master-password lifecycle: salt, key record, verification, rotation.
//!
//! The gate works on two files. `salt.bin` holds 32 random bytes,
//! generated once and reused for every derivation; `master.key` holds the
//! derived key itself and exists purely so a password attempt can be
//! verified by equality - the key is never decrypted back to a password.
//! Unlimited verification attempts are allowed; there is no lockout or
//! backoff (see DESIGN.md).

use std::io;
use std::path::PathBuf;

use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretBox};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::kdf::{self, KEY_LEN, SALT_LEN};
use crate::fs::write_atomic;

use super::paths::VaultPaths;
use super::session::VaultSession;

/// Punctuation characters accepted by the strength policy.
const PUNCTUATION: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Errors that can occur in the master-key lifecycle.
#[derive(Error, Debug)]
pub enum MasterKeyError {
    /// The proposed password fails the strength policy.
    #[error("password too weak: needs {0}")]
    WeakPassword(&'static str),

    /// The supplied password does not match the stored key record.
    #[error("incorrect master password")]
    IncorrectPassword,

    /// Setup was attempted but a key record already exists.
    #[error("a master password is already set")]
    AlreadyInitialized,

    /// Unlock was attempted but no key record exists yet.
    #[error("no master password has been set")]
    NotInitialized,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The salt file exists but does not hold exactly 32 bytes.
    #[error("salt file {path} is corrupt: expected {SALT_LEN} bytes, got {actual}")]
    InvalidSalt { path: PathBuf, actual: usize },

    /// The key record exists but does not hold exactly 32 bytes.
    #[error("master-key record {path} is corrupt: expected {KEY_LEN} bytes, got {actual}")]
    InvalidKeyRecord { path: PathBuf, actual: usize },

    /// The system RNG failed while generating a salt.
    #[error("system RNG failed to generate a salt")]
    Rng,
}

/// Gate state derived from the on-disk key record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// No master-key record exists; a password must be chosen first.
    AwaitingSetup,
    /// A record exists; the password must be verified to unlock.
    AwaitingVerification,
}

/// Check a proposed master password against the strength policy.
///
/// All four character classes are required simultaneously on top of the
/// minimum length: uppercase, lowercase, digit, and one of
/// `!@#$%^&*()_+-=[]{}|;:,.<>?`.
pub fn check_strength(password: &str) -> Result<(), MasterKeyError> {
    if password.chars().count() < 8 {
        return Err(MasterKeyError::WeakPassword("at least 8 characters"));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(MasterKeyError::WeakPassword("an uppercase letter"));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(MasterKeyError::WeakPassword("a lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(MasterKeyError::WeakPassword("a digit"));
    }
    if !password.chars().any(|c| PUNCTUATION.contains(c)) {
        return Err(MasterKeyError::WeakPassword(
            "a punctuation character (!@#$%^&* ...)",
        ));
    }
    Ok(())
}

/// Owns the salt and master-key record lifecycles and gates vault access.
#[derive(Debug, Clone)]
pub struct MasterKeyManager {
    paths: VaultPaths,
}

impl MasterKeyManager {
    pub fn new(paths: VaultPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    /// Which gate applies: setup for a fresh vault, verification otherwise.
    pub fn status(&self) -> KeyStatus {
        if self.paths.master_key_file().exists() {
            KeyStatus::AwaitingVerification
        } else {
            KeyStatus::AwaitingSetup
        }
    }

    /// First-time setup: enforce the strength policy, persist the key
    /// record, and open a session.
    ///
    /// The salt is created here if it does not exist yet and is never
    /// regenerated afterwards (only an import replaces it).
    pub fn setup(&self, password: &str) -> Result<VaultSession, MasterKeyError> {
        if self.status() == KeyStatus::AwaitingVerification {
            return Err(MasterKeyError::AlreadyInitialized);
        }
        check_strength(password)?;

        let salt = self.ensure_salt()?;
        let key = kdf::derive_key(password, &salt);
        self.write_key_record(&key)?;
        info!("master password set");

        Ok(VaultSession::new(self.paths.clone(), key))
    }

    /// Verify a password attempt and open a session on success.
    ///
    /// A wrong password leaves everything unchanged; callers may simply
    /// retry. The comparison against the stored record is constant-time.
    pub fn unlock(&self, password: &str) -> Result<VaultSession, MasterKeyError> {
        self.verify_password(password)?;
        let salt = self.read_salt()?;
        let key = kdf::derive_key(password, &salt);
        info!("vault unlocked");
        Ok(VaultSession::new(self.paths.clone(), key))
    }

    /// Check a password against the stored key record without opening a
    /// session.
    pub fn verify_password(&self, password: &str) -> Result<(), MasterKeyError> {
        let salt = self.read_salt()?;
        let stored = self.read_key_record()?;
        let derived = kdf::derive_key(password, &salt);
        if bool::from(derived.expose_secret().ct_eq(&stored[..])) {
            Ok(())
        } else {
            Err(MasterKeyError::IncorrectPassword)
        }
    }

    /// Read the salt, creating it on first use.
    pub(crate) fn ensure_salt(&self) -> Result<[u8; SALT_LEN], MasterKeyError> {
        let path = self.paths.salt_file();
        if path.exists() {
            return self.read_salt();
        }
        let mut salt = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| MasterKeyError::Rng)?;
        write_atomic(&path, &salt).map_err(|source| MasterKeyError::Write { path, source })?;
        info!("generated new vault salt");
        Ok(salt)
    }

    pub(crate) fn read_salt(&self) -> Result<[u8; SALT_LEN], MasterKeyError> {
        let path = self.paths.salt_file();
        let bytes = std::fs::read(&path).map_err(|source| MasterKeyError::Read {
            path: path.clone(),
            source,
        })?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| MasterKeyError::InvalidSalt {
                path,
                actual: bytes.len(),
            })
    }

    fn read_key_record(&self) -> Result<Zeroizing<[u8; KEY_LEN]>, MasterKeyError> {
        let path = self.paths.master_key_file();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MasterKeyError::NotInitialized);
            }
            Err(source) => return Err(MasterKeyError::Read { path, source }),
        };
        let record: [u8; KEY_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| MasterKeyError::InvalidKeyRecord {
                    path,
                    actual: bytes.len(),
                })?;
        Ok(Zeroizing::new(record))
    }

    pub(crate) fn write_key_record(
        &self,
        key: &SecretBox<[u8; KEY_LEN]>,
    ) -> Result<(), MasterKeyError> {
        let path = self.paths.master_key_file();
        write_atomic(&path, key.expose_secret())
            .map_err(|source| MasterKeyError::Write { path, source })
    }
}
