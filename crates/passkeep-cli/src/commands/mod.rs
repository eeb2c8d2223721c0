//! CLI subcommands.

pub mod add;
pub mod edit;
pub mod export;
pub mod groups;
pub mod import;
pub mod init;
pub mod list;
pub mod passwd;
pub mod rm;
pub mod search;
pub mod share;
pub mod show;

use anyhow::{Result, bail};

use passkeep_core::vault::{Credential, VaultStore};

/// Find a credential by exact title, optionally scoped to a group.
///
/// Titles are not unique; the first match in insertion order wins.
pub(crate) fn find_credential(
    store: &VaultStore,
    title: &str,
    group: Option<&str>,
) -> Result<Credential> {
    let found = store
        .entries()
        .iter()
        .find(|c| c.title == title && group.is_none_or(|g| c.group == g));
    match found {
        Some(credential) => Ok(credential.clone()),
        None => match group {
            Some(g) => bail!("no credential titled '{title}' in group '{g}'"),
            None => bail!("no credential titled '{title}'"),
        },
    }
}

/// Resolve a listing index to an absolute collection index.
///
/// With a group filter the index is the position within that group's
/// listing (what `list --group` displays); without one it is the absolute
/// position.
pub(crate) fn resolve_index(
    store: &VaultStore,
    index: usize,
    group: Option<&str>,
) -> Result<usize> {
    match group {
        Some(g) => store
            .resolve_group_index(g, index)
            .ok_or_else(|| anyhow::anyhow!("no credential at index {index} in group '{g}'")),
        None => {
            if index < store.len() {
                Ok(index)
            } else {
                bail!("no credential at index {index}");
            }
        }
    }
}
