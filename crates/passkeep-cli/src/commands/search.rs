//! Search command - case-insensitive lookup over titles, usernames and
//! notes, scoped to a group filter.

use anyhow::Result;
use clap::Args as ClapArgs;

use passkeep_core::vault::{Credential, VaultSession};

use crate::output::create_table;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Substring to look for
    pub query: String,

    /// Restrict the search to this group
    #[arg(short, long)]
    pub group: Option<String>,
}

pub fn execute(session: &VaultSession, args: &Args) -> Result<()> {
    let store = session.store();
    let hits: Vec<&Credential> = match &args.group {
        Some(group) => store.search(group, &args.query).collect(),
        None => store
            .entries()
            .iter()
            .filter(|c| c.matches(&args.query))
            .collect(),
    };

    if hits.is_empty() {
        println!("No matches for '{}'.", args.query);
        return Ok(());
    }

    let mut table = create_table(vec!["Title", "Username", "Group"]);
    for credential in hits {
        table.add_row(vec![
            credential.title.clone(),
            credential.username.clone(),
            credential.group.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}
