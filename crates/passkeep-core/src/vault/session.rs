//! The unlocked-vault context object.

use secrecy::SecretBox;

use crate::crypto::kdf::{self, KEY_LEN};

use super::master_key::{MasterKeyError, MasterKeyManager, check_strength};
use super::paths::VaultPaths;
use super::store::{LoadOutcome, StoreError, VaultStore};

/// An unlocked vault: paths, the session key, and the credential store.
///
/// Holding a `VaultSession` is proof that the master password passed the
/// gate - sessions are only constructed by [`MasterKeyManager`] and by a
/// committed import. Every operation takes the session explicitly; there
/// is no global state. Intentionally not `Clone`: exactly one holder of
/// the session key.
pub struct VaultSession {
    paths: VaultPaths,
    key: SecretBox<[u8; KEY_LEN]>,
    store: VaultStore,
}

impl VaultSession {
    pub(crate) fn new(paths: VaultPaths, key: SecretBox<[u8; KEY_LEN]>) -> Self {
        let store = VaultStore::new(paths.vault_file());
        Self { paths, key, store }
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VaultStore {
        &mut self.store
    }

    /// Load the persisted vault into the store.
    ///
    /// See [`VaultStore::load`] for the degraded outcomes.
    pub fn load(&mut self) -> Result<LoadOutcome, StoreError> {
        self.store.load(&self.key)
    }

    /// Encrypt and persist the store under the session key.
    pub fn save(&self) -> Result<(), StoreError> {
        self.store.save(&self.key)
    }

    /// Rotate the master password.
    ///
    /// Re-derives the key from `new_password` and the existing salt and
    /// atomically overwrites the key record. The vault file is NOT
    /// re-encrypted here: the caller must call [`save`](Self::save)
    /// immediately afterwards, or the persisted data stays encrypted
    /// under the old key and becomes unreadable in the next session.
    pub fn rotate_master_password(&mut self, new_password: &str) -> Result<(), MasterKeyError> {
        check_strength(new_password)?;
        let manager = MasterKeyManager::new(self.paths.clone());
        let salt = manager.read_salt()?;
        let key = kdf::derive_key(new_password, &salt);
        manager.write_key_record(&key)?;
        self.key = key;
        Ok(())
    }

    pub(crate) fn key(&self) -> &SecretBox<[u8; KEY_LEN]> {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::Credential;
    use crate::vault::master_key::MasterKeyManager;

    const PASSWORD: &str = "Session-Pw-1!";
    const NEW_PASSWORD: &str = "Rotated-Pw-2@";

    #[test]
    fn rotate_then_save_keeps_vault_readable() {
        let dir = tempfile::tempdir().unwrap();
        let manager = MasterKeyManager::new(VaultPaths::new(dir.path()));

        let mut session = manager.setup(PASSWORD).unwrap();
        session.store_mut().add(Credential::new("mail", "me", "pw")).unwrap();
        session.save().unwrap();

        session.rotate_master_password(NEW_PASSWORD).unwrap();
        // Upholding the contract: re-save under the new key.
        session.save().unwrap();
        drop(session);

        assert!(matches!(
            manager.unlock(PASSWORD),
            Err(MasterKeyError::IncorrectPassword)
        ));
        let mut session = manager.unlock(NEW_PASSWORD).unwrap();
        assert!(matches!(session.load().unwrap(), LoadOutcome::Loaded(1)));
    }

    #[test]
    fn rotate_without_save_orphans_the_vault_file() {
        let dir = tempfile::tempdir().unwrap();
        let manager = MasterKeyManager::new(VaultPaths::new(dir.path()));

        let mut session = manager.setup(PASSWORD).unwrap();
        session.store_mut().add(Credential::new("mail", "me", "pw")).unwrap();
        session.save().unwrap();

        // Contract violation: rotate but never re-save.
        session.rotate_master_password(NEW_PASSWORD).unwrap();
        drop(session);

        let mut session = manager.unlock(NEW_PASSWORD).unwrap();
        assert!(matches!(
            session.load().unwrap(),
            LoadOutcome::DecryptFailed(_)
        ));
    }

    #[test]
    fn rotate_enforces_strength_policy() {
        let dir = tempfile::tempdir().unwrap();
        let manager = MasterKeyManager::new(VaultPaths::new(dir.path()));
        let mut session = manager.setup(PASSWORD).unwrap();
        assert!(matches!(
            session.rotate_master_password("weak"),
            Err(MasterKeyError::WeakPassword(_))
        ));
    }
}
