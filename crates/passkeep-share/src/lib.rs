//! Ephemeral LAN sharing of a single credential over HTTP.
//!
//! A share session exposes exactly one credential snapshot at a random
//! URL path for as long as the caller keeps it running:
//!
//! 1. `start` picks an 8-character alphanumeric token, writes a plaintext
//!    snapshot file `share_<token>.json`, and binds an HTTP listener on
//!    all interfaces (port 8080 by default).
//! 2. `GET /<token>` renders a self-contained HTML page with the
//!    credential fields and copy buttons; every other path is a 404.
//! 3. `stop` shuts the listener down and deletes the snapshot. It is
//!    idempotent and also runs on drop.
//!
//! # Security
//!
//! Anyone on the LAN who learns the token can read the credential - that
//! is the point of the feature. The snapshot file is plaintext on disk
//! for the session's duration (created with owner-only permissions and
//! removed on stop); treat the exposure window accordingly and stop the
//! session as soon as the recipient has the data. Only one session can
//! bind the share port per host; a second `start` fails with
//! [`ShareError::Bind`].

mod error;
mod page;
mod server;
mod snapshot;

pub use error::{ShareError, ShareResult};
pub use server::{DEFAULT_SHARE_PORT, ServerConfig, ShareServer, local_ip};
pub use snapshot::{ShareSnapshot, ShareToken};
