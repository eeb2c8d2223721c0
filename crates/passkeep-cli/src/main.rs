#![deny(unsafe_code)]

mod commands;
mod exit_code;
mod output;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use passkeep_core::error::{MasterKeyError, TransferError};
use passkeep_core::vault::{
    KeyStatus, LoadOutcome, MasterKeyManager, VaultPaths, VaultSession, check_strength,
};
use passkeep_share::ShareError;

use crate::commands::{
    add, edit, export, groups, import, init, list, passwd, rm, search, share, show,
};

/// Command-line interface for the Passkeep password vault
#[derive(Parser)]
#[command(name = "passkeep")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # First run: choose a master password
    passkeep init

    # Add and list credentials
    passkeep add mail --username alice --entry-password hunter2
    passkeep list --group work

    # Script-friendly unlock (pipe password from a secret manager)
    echo \"$SECRET\" | passkeep --password-stdin list

    # Share one credential on the LAN, Ctrl-C to stop
    passkeep share mail
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Vault directory (default: the platform data directory)
    #[arg(long, value_name = "DIR", global = true)]
    vault_dir: Option<PathBuf>,

    /// Master password (insecure, prefer --password-stdin or PASSKEEP_PASSWORD)
    #[arg(long, env = "PASSKEEP_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Read master password from stdin (single line)
    #[arg(long, conflicts_with = "password", global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Password options extracted from the global CLI flags
#[derive(Clone, Default)]
pub struct PasswordOptions {
    pub password: Option<String>,
    pub password_stdin: bool,
}

impl From<&Cli> for PasswordOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            password: cli.password.clone(),
            password_stdin: cli.password_stdin,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the vault and set the master password
    Init(init::Args),

    /// List credentials
    List(list::Args),

    /// Show one credential's fields
    Show(show::Args),

    /// Add a credential
    Add(add::Args),

    /// Replace a credential's fields
    Edit(edit::Args),

    /// Remove a credential
    Rm(rm::Args),

    /// Search titles, usernames and notes
    Search(search::Args),

    /// List the known groups
    Groups,

    /// Export an encrypted backup archive
    Export(export::Args),

    /// Import a backup archive (replaces the live vault)
    Import(import::Args),

    /// Change the master password
    Passwd(passwd::Args),

    /// Share one credential on the LAN over HTTP
    Share(share::Args),
}

/// The user declined to provide input at a prompt.
#[derive(Debug, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);

            // Only print the error if not in quiet mode (parsed separately
            // because clap may not have run to completion)
            let args: Vec<String> = std::env::args().collect();
            let is_quiet = args.iter().any(|a| a == "-q" || a == "--quiet");

            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let password_opts = PasswordOptions::from(&cli);
    let paths = resolve_vault_paths(cli.vault_dir.clone())?;
    let manager = MasterKeyManager::new(paths.clone());

    match cli.command {
        // Gate commands that work directly on the manager
        Commands::Init(args) => init::execute(&manager, &password_opts, &args),
        Commands::Export(args) => export::execute(&manager, &password_opts, &args),
        Commands::Import(args) => import::execute(&paths, &password_opts, &args),

        // Commands that require an unlocked session
        Commands::List(args) => list::execute(&open_session(&manager, &password_opts)?, &args),
        Commands::Show(args) => show::execute(&open_session(&manager, &password_opts)?, &args),
        Commands::Add(args) => {
            add::execute(&mut open_session(&manager, &password_opts)?, &args)
        }
        Commands::Edit(args) => {
            edit::execute(&mut open_session(&manager, &password_opts)?, &args)
        }
        Commands::Rm(args) => rm::execute(&mut open_session(&manager, &password_opts)?, &args),
        Commands::Search(args) => {
            search::execute(&open_session(&manager, &password_opts)?, &args)
        }
        Commands::Groups => groups::execute(&open_session(&manager, &password_opts)?),
        Commands::Passwd(args) => {
            passwd::execute(&mut open_session(&manager, &password_opts)?, &args)
        }
        Commands::Share(args) => {
            share::execute(&open_session(&manager, &password_opts)?, &args)
        }
    }
}

/// Resolve the vault directory, creating it if necessary.
///
/// Failure here is fatal: without a directory for salt and key record
/// nothing else can proceed.
fn resolve_vault_paths(override_dir: Option<PathBuf>) -> Result<VaultPaths> {
    let dir = match override_dir {
        Some(dir) => dir,
        None => directories::ProjectDirs::from("", "", "passkeep")
            .context("cannot determine a data directory for this platform")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create vault directory {}", dir.display()))?;
    tracing::debug!(dir = %dir.display(), "using vault directory");
    Ok(VaultPaths::new(dir))
}

/// Unlock the vault, prompting interactively when no password was given.
///
/// Interactive attempts retry on a wrong password until the user submits
/// an empty line (abort). A password supplied via flag, env or stdin
/// fails immediately on mismatch so scripts see the error.
fn open_session(manager: &MasterKeyManager, opts: &PasswordOptions) -> Result<VaultSession> {
    if manager.status() == KeyStatus::AwaitingSetup {
        anyhow::bail!(
            "vault is not initialized - run `passkeep init` first (directory: {})",
            manager.paths().root().display()
        );
    }

    let mut session = match password_from_options(opts)? {
        Some(password) => manager.unlock(&password)?,
        None => unlock_interactive(manager)?,
    };

    match session.load()? {
        LoadOutcome::Loaded(_) | LoadOutcome::Empty => {}
        LoadOutcome::DecryptFailed(e) => {
            // Degrade per the store contract: keep running with an empty
            // collection, the on-disk file is untouched.
            eprintln!("Warning: could not decrypt the vault file ({e}); starting empty.");
        }
    }
    Ok(session)
}

fn unlock_interactive(manager: &MasterKeyManager) -> Result<VaultSession> {
    loop {
        let password = rpassword::prompt_password("Master password (empty to abort): ")
            .context("failed to read password")?;
        if password.is_empty() {
            return Err(Cancelled.into());
        }
        match manager.unlock(&password) {
            Ok(session) => return Ok(session),
            Err(MasterKeyError::IncorrectPassword) => {
                eprintln!("Incorrect master password, try again.");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Resolve an explicitly supplied password: --password / PASSKEEP_PASSWORD
/// first, then --password-stdin. `None` means "prompt interactively".
pub fn password_from_options(opts: &PasswordOptions) -> Result<Option<String>> {
    if let Some(ref password) = opts.password {
        return Ok(Some(password.clone()));
    }
    if opts.password_stdin {
        return read_password_from_stdin().map(Some);
    }
    Ok(None)
}

/// Get a password for a gate, preferring explicit options over a prompt.
pub fn password_or_prompt(opts: &PasswordOptions, prompt: &str) -> Result<String> {
    if let Some(password) = password_from_options(opts)? {
        return Ok(password);
    }
    let password = rpassword::prompt_password(prompt).context("failed to read password")?;
    if password.is_empty() {
        return Err(Cancelled.into());
    }
    Ok(password)
}

/// Read a password from stdin (first line only)
fn read_password_from_stdin() -> Result<String> {
    if io::stdin().is_terminal() {
        anyhow::bail!(
            "--password-stdin requires the password to be piped in.\n\
             Example: echo \"$SECRET\" | passkeep --password-stdin list"
        );
    }

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches('\n').trim_end_matches('\r');

    if password.is_empty() {
        anyhow::bail!("password from stdin is empty");
    }
    Ok(password.to_string())
}

/// Prompt for a new master password: entered twice, policy-checked.
///
/// An empty line at either prompt aborts.
pub fn prompt_new_password() -> Result<String> {
    loop {
        let password = rpassword::prompt_password("New master password (empty to abort): ")
            .context("failed to read password")?;
        if password.is_empty() {
            return Err(Cancelled.into());
        }
        if let Err(e) = check_strength(&password) {
            eprintln!(
                "{e}.\nA master password needs at least 8 characters with an uppercase \
                 letter, a lowercase letter, a digit and a punctuation character."
            );
            continue;
        }
        let confirmation = rpassword::prompt_password("Confirm master password: ")
            .context("failed to read password")?;
        if confirmation.is_empty() {
            return Err(Cancelled.into());
        }
        if password != confirmation {
            eprintln!("Passwords do not match, try again.");
            continue;
        }
        return Ok(password);
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` declines.
pub fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Categorize an error into an exit code using typed error downcasting
///
/// More robust than string matching: the mapping survives changes to
/// error message wording.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<Cancelled>().is_some() {
            return exit_code::CANCELLED;
        }

        if let Some(key_err) = cause.downcast_ref::<MasterKeyError>() {
            return match key_err {
                MasterKeyError::IncorrectPassword => exit_code::AUTH_FAILED,
                MasterKeyError::WeakPassword(_) => exit_code::WEAK_PASSWORD,
                MasterKeyError::NotInitialized => exit_code::NOT_FOUND,
                MasterKeyError::AlreadyInitialized => exit_code::GENERAL_ERROR,
                // Salt or key-record trouble is unrecoverable initialization
                // failure territory.
                MasterKeyError::Read { .. }
                | MasterKeyError::Write { .. }
                | MasterKeyError::InvalidSalt { .. }
                | MasterKeyError::InvalidKeyRecord { .. }
                | MasterKeyError::Rng => exit_code::INIT_FATAL,
            };
        }

        if let Some(transfer_err) = cause.downcast_ref::<TransferError>() {
            match transfer_err {
                TransferError::Auth | TransferError::AuthOrCorruption(_) => {
                    return exit_code::AUTH_FAILED;
                }
                TransferError::Format(_) => return exit_code::FORMAT_INVALID,
                _ => {}
            }
        }

        if let Some(share_err) = cause.downcast_ref::<ShareError>() {
            if matches!(share_err, ShareError::Bind { .. }) {
                return exit_code::BIND_FAILED;
            }
        }

        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::PermissionDenied => return exit_code::PERMISSION_DENIED,
                io::ErrorKind::NotFound => return exit_code::NOT_FOUND,
                io::ErrorKind::Interrupted => return exit_code::CANCELLED,
                _ => {}
            }
        }
    }

    exit_code::GENERAL_ERROR
}
