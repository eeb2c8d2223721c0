//! Error types for share sessions.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors that can occur while starting or running a share session.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The share port is already bound.
    ///
    /// The port is fixed per configuration, so only one share session can
    /// be active on a host at a time; a concurrent `start` lands here.
    #[error("cannot bind share listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Snapshot file I/O failed.
    #[error("share snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The snapshot could not be encoded.
    #[error("failed to encode share snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Result type for share operations.
pub type ShareResult<T> = Result<T, ShareError>;
