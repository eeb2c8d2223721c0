//! Add command - append a credential and persist.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use passkeep_core::vault::{Credential, VaultSession};

use crate::Cancelled;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Title of the new credential
    pub title: String,

    /// Account username
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// The credential's password (prompted when omitted)
    #[arg(long, value_name = "PASSWORD")]
    pub entry_password: Option<String>,

    /// Login URL
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Group to file the entry under (default group when omitted)
    #[arg(short, long)]
    pub group: Option<String>,
}

pub fn execute(session: &mut VaultSession, args: &Args) -> Result<()> {
    let entry_password = match &args.entry_password {
        Some(password) => password.clone(),
        None => {
            let password = rpassword::prompt_password(format!(
                "Password for '{}' (empty to abort): ",
                args.title
            ))
            .context("failed to read password")?;
            if password.is_empty() {
                return Err(Cancelled.into());
            }
            password
        }
    };

    let mut credential = Credential::new(&args.title, &args.username, entry_password);
    if let Some(url) = &args.url {
        credential = credential.with_url(url);
    }
    if let Some(notes) = &args.notes {
        credential = credential.with_notes(notes);
    }
    if let Some(group) = &args.group {
        credential = credential.with_group(group);
    }

    session.store_mut().add(credential)?;
    session.save()?;
    println!("Added '{}'.", args.title);
    Ok(())
}
