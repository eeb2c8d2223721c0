//! List command - tabulate credentials, optionally filtered by group.
//!
//! The Index column is what `edit` and `rm` take: absolute positions
//! without a filter, group-scoped display positions with one.

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;

use passkeep_core::vault::{Credential, VaultSession};

use crate::output::create_table;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Only list entries in this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Output as JSON (includes passwords - intended for scripting)
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    group: Option<&'a str>,
    entries: Vec<&'a Credential>,
}

pub fn execute(session: &VaultSession, args: &Args) -> Result<()> {
    let store = session.store();
    let entries: Vec<&Credential> = match &args.group {
        Some(group) => store.list_by_group(group).collect(),
        None => store.entries().iter().collect(),
    };

    if args.json {
        let output = ListOutput {
            group: args.group.as_deref(),
            entries,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if entries.is_empty() {
        match &args.group {
            Some(group) => println!("No credentials in group '{group}'."),
            None => println!("No credentials stored."),
        }
        return Ok(());
    }

    let mut table = create_table(vec!["Index", "Title", "Username", "Group", "URL"]);
    for (index, credential) in entries.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            credential.title.clone(),
            credential.username.clone(),
            credential.group.clone(),
            credential.url.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}
