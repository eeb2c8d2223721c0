//! Core encrypted-vault library for Passkeep.
//!
//! Everything here is synchronous: key derivation, the ciphertext codec,
//! the credential store with atomic persistence, master-password lifecycle
//! and archive import/export. Network sharing lives in the separate
//! `passkeep-share` crate; presentation lives in `passkeep-cli`.
//!
//! # Example
//!
//! ```no_run
//! use passkeep_core::vault::{Credential, MasterKeyManager, VaultPaths};
//!
//! let paths = VaultPaths::new("/home/me/.local/share/passkeep");
//! let manager = MasterKeyManager::new(paths);
//! let mut session = manager.unlock("Correct-Horse-1!")?;
//! session.load()?;
//! session.store_mut().add(Credential::new("example.org", "me", "hunter2"))?;
//! session.save()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod crypto;
pub mod error;
pub mod fs;
pub mod vault;
