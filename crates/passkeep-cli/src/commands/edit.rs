//! Edit command - replace a credential's fields in place.
//!
//! The store's edit is a full replacement; this command builds the
//! replacement from the existing entry plus whichever flags were given.

use anyhow::Result;
use clap::Args as ClapArgs;

use passkeep_core::vault::VaultSession;

use super::resolve_index;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Listing index of the credential (see `list`)
    pub index: usize,

    /// Interpret the index within this group's listing
    #[arg(short, long)]
    pub group: Option<String>,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New username
    #[arg(short, long)]
    pub username: Option<String>,

    /// New password
    #[arg(long, value_name = "PASSWORD")]
    pub entry_password: Option<String>,

    /// New login URL (empty string clears it)
    #[arg(long)]
    pub url: Option<String>,

    /// New notes (empty string clears them)
    #[arg(long)]
    pub notes: Option<String>,

    /// Move the entry to another group
    #[arg(long, value_name = "GROUP")]
    pub move_to: Option<String>,
}

pub fn execute(session: &mut VaultSession, args: &Args) -> Result<()> {
    let absolute = resolve_index(session.store(), args.index, args.group.as_deref())?;

    let mut replacement = session.store().entries()[absolute].clone();
    if let Some(title) = &args.title {
        replacement.title = title.clone();
    }
    if let Some(username) = &args.username {
        replacement.username = username.clone();
    }
    if let Some(password) = &args.entry_password {
        replacement.password = password.clone();
    }
    if let Some(url) = &args.url {
        replacement.url = if url.is_empty() { None } else { Some(url.clone()) };
    }
    if let Some(notes) = &args.notes {
        replacement.notes = if notes.is_empty() { None } else { Some(notes.clone()) };
    }
    if let Some(group) = &args.move_to {
        replacement.group = group.clone();
    }

    let title = replacement.title.clone();
    session.store_mut().update(absolute, replacement)?;
    session.save()?;
    println!("Updated '{title}'.");
    Ok(())
}
