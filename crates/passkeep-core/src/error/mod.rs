//! Error types re-exported for downstream crates.

pub use crate::crypto::cipher::{DecryptError, EncryptError};
pub use crate::vault::master_key::MasterKeyError;
pub use crate::vault::store::StoreError;
pub use crate::vault::transfer::TransferError;
