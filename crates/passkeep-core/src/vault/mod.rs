//! Vault-level abstractions and operations

pub mod entry;
pub mod master_key;
pub mod paths;
pub mod session;
pub mod store;
pub mod transfer;

// Re-export commonly used types
pub use entry::{Credential, DEFAULT_GROUP};
pub use master_key::{KeyStatus, MasterKeyError, MasterKeyManager, check_strength};
pub use paths::{MASTER_KEY_FILE, SALT_FILE, VAULT_FILE, VaultPaths};
pub use session::VaultSession;
pub use store::{LoadOutcome, StoreError, VaultStore};
pub use transfer::{
    ArchivePayload, ExportArchive, PendingImport, TransferError, export, prepare_import,
};
