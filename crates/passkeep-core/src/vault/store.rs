//! The in-memory credential collection and its persistence.
//!
//! `VaultStore` exclusively owns the credential sequence. Mutations are
//! in-memory only; callers persist explicitly with [`VaultStore::save`],
//! which encrypts and atomically replaces the vault file.

use std::io;
use std::path::PathBuf;

use secrecy::SecretBox;
use thiserror::Error;
use tracing::{debug, warn};

use crate::crypto::cipher::{DecryptError, EncryptError, decrypt_value, encrypt_value};
use crate::crypto::kdf::KEY_LEN;
use crate::fs::write_atomic;

use super::entry::{Credential, DEFAULT_GROUP};

/// Errors that can occur while loading or saving the vault file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read vault file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write vault file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encrypt vault: {0}")]
    Encrypt(#[from] EncryptError),

    /// Every credential must carry a non-empty title.
    #[error("credential title must not be empty")]
    EmptyTitle,

    #[error("no credential at index {0}")]
    IndexOutOfRange(usize),
}

/// What [`VaultStore::load`] found on disk.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The vault file decrypted; carries the number of entries loaded.
    Loaded(usize),
    /// The file is missing or empty - the vault starts empty.
    Empty,
    /// The ciphertext could not be decrypted. The in-memory vault is
    /// empty and the on-disk file was left untouched so the data can
    /// still be recovered with the right key.
    DecryptFailed(DecryptError),
}

/// Owns the credential collection and its single persisted file.
#[derive(Debug)]
pub struct VaultStore {
    vault_file: PathBuf,
    entries: Vec<Credential>,
}

impl VaultStore {
    pub fn new(vault_file: PathBuf) -> Self {
        Self {
            vault_file,
            entries: Vec::new(),
        }
    }

    /// Load the persisted vault, replacing the in-memory collection.
    ///
    /// Decrypt failure is not an error: the store degrades to an empty
    /// collection and reports the cause in the outcome, leaving the file
    /// on disk untouched. Only I/O failures propagate.
    pub fn load(&mut self, key: &SecretBox<[u8; KEY_LEN]>) -> Result<LoadOutcome, StoreError> {
        self.entries.clear();

        let text = match std::fs::read_to_string(&self.vault_file) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::Empty),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.vault_file.clone(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(LoadOutcome::Empty);
        }

        match decrypt_value::<Vec<Credential>>(key, &text) {
            Ok(mut entries) => {
                for entry in &mut entries {
                    entry.normalize();
                }
                let count = entries.len();
                self.entries = entries;
                debug!(entries = count, "vault loaded");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!(error = %e, "vault decrypt failed, starting with an empty collection");
                Ok(LoadOutcome::DecryptFailed(e))
            }
        }
    }

    /// Encrypt and persist the collection.
    ///
    /// Writes to a temporary file and atomically renames it over the
    /// vault file: a crash mid-save never corrupts the previous version.
    pub fn save(&self, key: &SecretBox<[u8; KEY_LEN]>) -> Result<(), StoreError> {
        let ciphertext = encrypt_value(key, &self.entries)?;
        write_atomic(&self.vault_file, ciphertext.as_bytes()).map_err(|source| {
            StoreError::Write {
                path: self.vault_file.clone(),
                source,
            }
        })?;
        debug!(entries = self.entries.len(), "vault saved");
        Ok(())
    }

    pub fn entries(&self) -> &[Credential] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The known groups: the default group plus every distinct group
    /// appearing in the collection. Derived, never stored.
    pub fn groups(&self) -> Vec<String> {
        let mut groups = vec![DEFAULT_GROUP.to_string()];
        for entry in &self.entries {
            if !groups.contains(&entry.group) {
                groups.push(entry.group.clone());
            }
        }
        groups
    }

    /// Entries whose group matches `group` exactly, in insertion order.
    pub fn list_by_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Credential> {
        self.entries.iter().filter(move |c| c.group == group)
    }

    /// Case-insensitive substring search over title, username and notes,
    /// scoped to `group`.
    pub fn search<'a>(
        &'a self,
        group: &'a str,
        query: &'a str,
    ) -> impl Iterator<Item = &'a Credential> {
        self.list_by_group(group).filter(move |c| c.matches(query))
    }

    /// Map a display index within `group`'s filtered listing back to the
    /// absolute collection index.
    ///
    /// The mapping is stable only while the collection is unchanged;
    /// resolving an index taken before a mutation is a caller error.
    pub fn resolve_group_index(&self, group: &str, display_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, c)| c.group == group)
            .nth(display_index)
            .map(|(index, _)| index)
    }

    /// Append a credential to the collection.
    pub fn add(&mut self, mut credential: Credential) -> Result<(), StoreError> {
        if credential.title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        credential.normalize();
        self.entries.push(credential);
        Ok(())
    }

    /// Replace the credential at the absolute `index` in full.
    pub fn update(&mut self, index: usize, mut credential: Credential) -> Result<(), StoreError> {
        if credential.title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        credential.normalize();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange(index))?;
        *slot = credential;
        Ok(())
    }

    /// Remove and return the credential at the absolute `index`.
    pub fn remove(&mut self, index: usize) -> Result<Credential, StoreError> {
        if index >= self.entries.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        Ok(self.entries.remove(index))
    }
}
