//! Share command - expose one credential on the LAN until Ctrl-C.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;

use passkeep_core::vault::VaultSession;
use passkeep_share::{DEFAULT_SHARE_PORT, ServerConfig, ShareServer, local_ip};

use super::find_credential;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Title of the credential to share
    pub title: String,

    /// Restrict the lookup to this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Listener port (one share session per host can bind it)
    #[arg(long, default_value_t = DEFAULT_SHARE_PORT)]
    pub port: u16,
}

pub fn execute(session: &VaultSession, args: &Args) -> Result<()> {
    let credential = find_credential(session.store(), &args.title, args.group.as_deref())?;

    let config = ServerConfig {
        port: args.port,
        ..ServerConfig::default()
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    let mut server = runtime.block_on(ShareServer::start(
        session.paths().root(),
        &credential,
        config,
    ))?;

    println!(
        "Sharing '{}' at {}",
        credential.title,
        server.url(local_ip())
    );
    println!("Anyone on the LAN with this link can read the credential.");
    println!("Press Ctrl-C to stop sharing.");

    let (tx, rx) = std::sync::mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("failed to install the Ctrl-C handler")?;
    let _ = rx.recv();

    runtime.block_on(server.stop());
    println!("Share stopped; snapshot deleted.");
    Ok(())
}
