//! Share tokens and the on-disk credential snapshot.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use passkeep_core::vault::Credential;

use crate::error::ShareResult;

/// Length of the random path token in characters.
const TOKEN_LEN: usize = 8;

/// The random alphanumeric path segment granting access to one share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken(String);

impl ShareToken {
    /// Generate a fresh 8-character alphanumeric token.
    pub fn generate() -> Self {
        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an incoming path segment even has the shape of a token.
    ///
    /// Tokens are the only thing we ever interpolate into a file name, so
    /// anything that is not exactly 8 alphanumeric characters is rejected
    /// before it reaches the filesystem.
    pub(crate) fn is_valid_segment(segment: &str) -> bool {
        segment.len() == TOKEN_LEN && segment.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl std::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The plaintext credential snapshot served for a session's lifetime.
///
/// Written as `share_<token>.json` next to the vault files and deleted
/// when the session stops. Absent URL and notes collapse to empty
/// strings, which the page renderer omits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareSnapshot {
    pub title: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
    pub timestamp: String,
}

impl ShareSnapshot {
    /// Snapshot a credential at the current local time.
    pub fn capture(credential: &Credential) -> Self {
        Self {
            title: credential.title.clone(),
            username: credential.username.clone(),
            password: credential.password.clone(),
            url: credential.url.clone().unwrap_or_default(),
            notes: credential.notes.clone().unwrap_or_default(),
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// File name for a token's snapshot.
    pub(crate) fn file_name(token: &str) -> String {
        format!("share_{token}.json")
    }

    /// Write the snapshot into `dir` with owner-only permissions.
    pub(crate) fn write(&self, dir: &Path, token: &ShareToken) -> ShareResult<PathBuf> {
        let path = dir.join(Self::file_name(token.as_str()));
        let json = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::io::Write as _;
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)?;
            file.write_all(json.as_bytes())?;
        }
        #[cfg(not(unix))]
        std::fs::write(&path, &json)?;

        Ok(path)
    }
}
