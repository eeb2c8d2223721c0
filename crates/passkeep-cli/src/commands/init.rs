//! Init command - set up the master password and create an empty vault.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use passkeep_core::vault::{KeyStatus, MasterKeyManager};

use crate::{PasswordOptions, password_from_options, prompt_new_password};

#[derive(ClapArgs, Clone)]
pub struct Args {}

pub fn execute(manager: &MasterKeyManager, opts: &PasswordOptions, _args: &Args) -> Result<()> {
    if manager.status() == KeyStatus::AwaitingVerification {
        anyhow::bail!(
            "vault at {} is already initialized",
            manager.paths().root().display()
        );
    }

    // Interactive setup prompts twice and loops on a weak password;
    // a password given via flag/env/stdin is checked once and fails hard.
    let password = match password_from_options(opts)? {
        Some(password) => password,
        None => prompt_new_password()?,
    };

    let session = manager.setup(&password)?;
    // Create the vault file up front so the directory is complete.
    session.save().context("failed to create the vault file")?;

    println!(
        "Vault initialized at {}",
        manager.paths().root().display()
    );
    println!("Remember the master password - it cannot be recovered.");
    Ok(())
}
