//! Remove command - delete a credential and persist.

use anyhow::Result;
use clap::Args as ClapArgs;

use passkeep_core::vault::VaultSession;

use crate::{Cancelled, confirm};

use super::resolve_index;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Listing index of the credential (see `list`)
    pub index: usize,

    /// Interpret the index within this group's listing
    #[arg(short, long)]
    pub group: Option<String>,

    /// Delete without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn execute(session: &mut VaultSession, args: &Args) -> Result<()> {
    let absolute = resolve_index(session.store(), args.index, args.group.as_deref())?;
    let title = session.store().entries()[absolute].title.clone();

    if !args.yes && !confirm(&format!("Delete '{title}'?"))? {
        return Err(Cancelled.into());
    }

    session.store_mut().remove(absolute)?;
    session.save()?;
    println!("Removed '{title}'.");
    Ok(())
}
