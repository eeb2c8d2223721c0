//! Passwd command - rotate the master password.
//!
//! Rotation only rewrites the key record; the vault must be re-saved
//! under the new key in the same breath, which this command does.

use anyhow::Result;
use clap::Args as ClapArgs;

use passkeep_core::vault::VaultSession;

use crate::prompt_new_password;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// The new master password (prompted twice when omitted)
    #[arg(
        long,
        env = "PASSKEEP_NEW_PASSWORD",
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub new_password: Option<String>,
}

pub fn execute(session: &mut VaultSession, args: &Args) -> Result<()> {
    let new_password = match &args.new_password {
        Some(password) => password.clone(),
        None => prompt_new_password()?,
    };

    session.rotate_master_password(&new_password)?;
    // Re-encrypt immediately: without this save the vault file would stay
    // bound to the old key and become unreadable next session.
    session.save()?;

    println!("Master password changed.");
    Ok(())
}
