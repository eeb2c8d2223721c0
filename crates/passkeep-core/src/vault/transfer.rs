//! Vault archive export and import.
//!
//! An export bundles the raw on-disk ciphertext together with the salt -
//! nothing is re-encrypted, so the archive stays bound to whatever
//! password encrypted the live vault at export time. Import is the
//! destructive inverse: after a trial decryption proves the password, the
//! live salt, master-key record and vault file are all replaced by the
//! archive's values.

use std::io;
use std::path::PathBuf;

use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;
use thiserror::Error;
use tracing::info;

use crate::crypto::cipher::{DecryptError, Envelope, decrypt_value};
use crate::crypto::kdf::{self, KEY_LEN, SALT_LEN};
use crate::fs::write_atomic;

use super::entry::Credential;
use super::master_key::{MasterKeyError, MasterKeyManager};
use super::paths::VaultPaths;
use super::session::VaultSession;
use super::store::StoreError;

/// Errors that can occur during export or import.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The current master password did not verify (export gate).
    #[error("incorrect master password")]
    Auth,

    /// The archive is structurally invalid.
    #[error("malformed archive: {0}")]
    Format(String),

    /// The archive did not decrypt under the supplied password.
    ///
    /// A wrong password and a corrupted archive are indistinguishable by
    /// design - both surface as a padding or plaintext failure from the
    /// cipher.
    #[error("archive password is incorrect or the archive is corrupted")]
    AuthOrCorruption(#[source] DecryptError),

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

    #[error(transparent)]
    MasterKey(MasterKeyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `encrypted_data` as found in the wild: either the raw vault-file
/// string, or a structured envelope object (older exporters wrote the
/// latter shape).
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArchivePayload {
    Envelope(Envelope),
    Raw(String),
}

impl ArchivePayload {
    /// The payload as vault-file text, exactly as it should land on disk.
    fn to_vault_text(&self) -> Result<String, TransferError> {
        match self {
            ArchivePayload::Raw(text) => Ok(text.clone()),
            ArchivePayload::Envelope(envelope) => serde_json::to_string(envelope)
                .map_err(|e| TransferError::Format(format!("unencodable envelope: {e}"))),
        }
    }
}

/// A portable vault backup: raw ciphertext plus the salt it was derived
/// under.
#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportArchive {
    pub encrypted_data: ArchivePayload,
    #[serde_as(as = "Base64")]
    pub salt: Vec<u8>,
}

impl ExportArchive {
    /// Parse an archive from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, TransferError> {
        serde_json::from_str(text).map_err(|e| {
            TransferError::Format(format!("expected encrypted_data and salt fields: {e}"))
        })
    }

    /// Serialize the archive for writing to a backup file.
    pub fn to_json(&self) -> Result<String, TransferError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TransferError::Format(format!("unencodable archive: {e}")))
    }
}

/// Export the live vault as a portable archive.
///
/// `current_password` must verify against the active master-key record;
/// the vault ciphertext is bundled verbatim. A vault that has never been
/// saved exports an empty payload.
pub fn export(
    manager: &MasterKeyManager,
    current_password: &str,
) -> Result<ExportArchive, TransferError> {
    manager
        .verify_password(current_password)
        .map_err(|e| match e {
            MasterKeyError::IncorrectPassword => TransferError::Auth,
            other => TransferError::MasterKey(other),
        })?;

    let salt = manager.read_salt().map_err(TransferError::MasterKey)?;
    let vault_file = manager.paths().vault_file();
    let ciphertext = match std::fs::read_to_string(&vault_file) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(TransferError::Read {
                path: vault_file,
                source,
            });
        }
    };

    info!("vault exported");
    Ok(ExportArchive {
        encrypted_data: ArchivePayload::Raw(ciphertext),
        salt: salt.to_vec(),
    })
}

/// A validated import, waiting for explicit confirmation.
///
/// Produced by [`prepare_import`] once the archive's shape checked out
/// and a trial decryption under the supplied password succeeded. Nothing
/// on disk has changed yet; the destructive step is [`commit`].
///
/// [`commit`]: PendingImport::commit
#[derive(Debug)]
pub struct PendingImport {
    salt: [u8; SALT_LEN],
    key: SecretBox<[u8; KEY_LEN]>,
    vault_text: String,
    entry_count: usize,
}

impl PendingImport {
    /// How many credentials the archive holds - for confirmation prompts.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Replace the live vault with the archive.
    ///
    /// Overwrites `salt.bin`, `master.key` and the vault file (archive
    /// ciphertext verbatim), in that order, each atomically, then reloads
    /// and returns the new session. From here on the vault's master
    /// password is the password the archive was prepared with.
    pub fn commit(self, paths: &VaultPaths) -> Result<VaultSession, TransferError> {
        write_atomic(&paths.salt_file(), &self.salt).map_err(|source| TransferError::Write {
            path: paths.salt_file(),
            source,
        })?;

        let manager = MasterKeyManager::new(paths.clone());
        manager
            .write_key_record(&self.key)
            .map_err(TransferError::MasterKey)?;

        write_atomic(&paths.vault_file(), self.vault_text.as_bytes()).map_err(|source| {
            TransferError::Write {
                path: paths.vault_file(),
                source,
            }
        })?;

        let mut session = VaultSession::new(paths.clone(), self.key);
        session.load()?;
        info!(entries = self.entry_count, "vault imported");
        Ok(session)
    }
}

/// Validate an archive and trial-decrypt it under `password`.
///
/// # Errors
///
/// * [`TransferError::Format`] - missing/misshapen fields or a salt that
///   is not exactly 32 bytes
/// * [`TransferError::AuthOrCorruption`] - the trial decryption failed
pub fn prepare_import(
    archive: &ExportArchive,
    password: &str,
) -> Result<PendingImport, TransferError> {
    let salt: [u8; SALT_LEN] = archive.salt.as_slice().try_into().map_err(|_| {
        TransferError::Format(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            archive.salt.len()
        ))
    })?;

    let vault_text = archive.encrypted_data.to_vault_text()?;
    let key = kdf::derive_key(password, &salt);

    let entries: Vec<Credential> =
        decrypt_value(&key, &vault_text).map_err(TransferError::AuthOrCorruption)?;

    Ok(PendingImport {
        salt,
        key,
        vault_text,
        entry_count: entries.len(),
    })
}
