//! Show command - print one credential's fields.

use anyhow::Result;
use clap::Args as ClapArgs;

use passkeep_core::vault::VaultSession;

use crate::output::MASKED_PASSWORD;

use super::find_credential;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Title of the credential to show
    pub title: String,

    /// Restrict the lookup to this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Print the password instead of masking it
    #[arg(long)]
    pub reveal: bool,

    /// Output as JSON (always includes the password)
    #[arg(long)]
    pub json: bool,
}

pub fn execute(session: &VaultSession, args: &Args) -> Result<()> {
    let credential = find_credential(session.store(), &args.title, args.group.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&credential)?);
        return Ok(());
    }

    println!("Title:    {}", credential.title);
    println!("Username: {}", credential.username);
    if args.reveal {
        println!("Password: {}", credential.password);
    } else {
        println!("Password: {MASKED_PASSWORD} (use --reveal to print)");
    }
    if let Some(url) = &credential.url {
        println!("URL:      {url}");
    }
    if let Some(notes) = &credential.notes {
        println!("Notes:    {notes}");
    }
    println!("Group:    {}", credential.group);
    Ok(())
}
