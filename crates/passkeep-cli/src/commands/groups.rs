//! Groups command - list the derived group set.

use anyhow::Result;

use passkeep_core::vault::VaultSession;

pub fn execute(session: &VaultSession) -> Result<()> {
    let store = session.store();
    for group in store.groups() {
        let count = store.list_by_group(&group).count();
        println!("{group} ({count})");
    }
    Ok(())
}
