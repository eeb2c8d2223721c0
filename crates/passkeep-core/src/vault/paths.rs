//! On-disk layout of a vault directory.

use std::path::{Path, PathBuf};

/// Name of the encrypted credential file.
pub const VAULT_FILE: &str = "passwords.json";

/// Name of the raw 32-byte salt file.
pub const SALT_FILE: &str = "salt.bin";

/// Name of the derived master-key record.
pub const MASTER_KEY_FILE: &str = "master.key";

/// The set of files making up one vault, rooted in a single directory.
#[derive(Debug, Clone)]
pub struct VaultPaths {
    root: PathBuf,
}

impl VaultPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `passwords.json` - one ciphertext blob, the only persisted view of
    /// the credential collection.
    pub fn vault_file(&self) -> PathBuf {
        self.root.join(VAULT_FILE)
    }

    /// `salt.bin` - raw 32 bytes, generated once.
    pub fn salt_file(&self) -> PathBuf {
        self.root.join(SALT_FILE)
    }

    /// `master.key` - the derived key, used only for equality verification.
    pub fn master_key_file(&self) -> PathBuf {
        self.root.join(MASTER_KEY_FILE)
    }
}
