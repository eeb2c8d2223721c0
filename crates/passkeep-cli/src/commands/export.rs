//! Export command - write a portable encrypted backup archive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use passkeep_core::vault::{MasterKeyManager, transfer};

use crate::{PasswordOptions, password_or_prompt};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Where to write the archive
    #[arg(default_value = "passkeep_backup.json")]
    pub output: PathBuf,
}

pub fn execute(manager: &MasterKeyManager, opts: &PasswordOptions, args: &Args) -> Result<()> {
    // The export gate re-verifies the master password even in an
    // otherwise unlocked UI flow.
    let password = password_or_prompt(opts, "Master password: ")?;
    let archive = transfer::export(manager, &password)?;

    std::fs::write(&args.output, archive.to_json()?)
        .with_context(|| format!("failed to write archive to {}", args.output.display()))?;

    println!("Exported vault to {}", args.output.display());
    println!("The archive stays encrypted under the current master password.");
    Ok(())
}
