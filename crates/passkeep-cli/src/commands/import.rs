//! Import command - replace the live vault with a backup archive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use passkeep_core::vault::{ExportArchive, VaultPaths, transfer};

use crate::{Cancelled, PasswordOptions, confirm, password_or_prompt};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Archive file to import
    pub input: PathBuf,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn execute(paths: &VaultPaths, opts: &PasswordOptions, args: &Args) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read archive {}", args.input.display()))?;
    let archive = ExportArchive::from_json(&text)?;

    // The archive's own password, not the live vault's - after the commit
    // it becomes the master password.
    let password = password_or_prompt(opts, "Archive password: ")?;
    let pending = transfer::prepare_import(&archive, &password)?;

    println!(
        "Archive holds {} credential(s). Importing replaces the live vault, \
         salt and master password.",
        pending.entry_count()
    );
    if !args.yes && !confirm("Continue?")? {
        return Err(Cancelled.into());
    }

    let session = pending.commit(paths)?;
    println!(
        "Imported {} credential(s). The archive password is now the master password.",
        session.store().len()
    );
    Ok(())
}
