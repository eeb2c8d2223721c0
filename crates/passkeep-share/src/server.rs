//! HTTP listener lifecycle for share sessions.
//!
//! This module provides the HTTP server that exposes one credential
//! snapshot at a random token path and handles the session lifecycle
//! (start, stop).

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use passkeep_core::vault::Credential;

use crate::error::ShareError;
use crate::page;
use crate::snapshot::{ShareSnapshot, ShareToken};

/// The fixed share port. One session per host can bind it at a time.
pub const DEFAULT_SHARE_PORT: u16 = 8080;

/// Configuration for the share listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 = auto-assign, used by tests).
    pub port: u16,
    /// Bind address. Shares are meant for the LAN, so the default is
    /// all interfaces.
    pub bind_address: IpAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SHARE_PORT,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

/// A running share session: one credential snapshot behind one token.
///
/// Stopping (explicitly or by drop) shuts the listener down and deletes
/// the snapshot file, after which every request is a 404.
pub struct ShareServer {
    /// The actual bound address.
    pub addr: SocketAddr,
    token: ShareToken,
    snapshot_path: PathBuf,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ShareServer {
    /// Start sharing `credential`.
    ///
    /// Writes the snapshot file into `snapshot_dir`, binds the listener
    /// and spawns the accept loop. The snapshot is cleaned up again if
    /// the bind fails.
    ///
    /// # Errors
    ///
    /// * [`ShareError::Bind`] - the port is taken (another session is
    ///   already active)
    /// * [`ShareError::Io`] / [`ShareError::Snapshot`] - snapshot write
    ///   failures
    pub async fn start(
        snapshot_dir: &Path,
        credential: &Credential,
        config: ServerConfig,
    ) -> Result<Self, ShareError> {
        let token = ShareToken::generate();
        let snapshot = ShareSnapshot::capture(credential);
        let snapshot_path = snapshot.write(snapshot_dir, &token)?;

        let addr = SocketAddr::new(config.bind_address, config.port);
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                // Don't leave the plaintext snapshot behind on failure.
                let _ = std::fs::remove_file(&snapshot_path);
                return Err(ShareError::Bind { addr, source });
            }
        };
        let actual_addr = listener.local_addr()?;

        info!(addr = %actual_addr, token = %token, "share session started");

        let snapshot_dir = Arc::new(snapshot_dir.to_path_buf());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_handle = tokio::spawn(async move {
            tokio::select! {
                () = run_server(listener, snapshot_dir) => {
                    debug!("share accept loop ended");
                }
                _ = shutdown_rx => {
                    info!("share session received shutdown signal");
                }
            }
        });

        Ok(Self {
            addr: actual_addr,
            token,
            snapshot_path,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// The session's access token.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    /// The share URL as reachable via `host`.
    pub fn url(&self, host: IpAddr) -> String {
        format!("http://{host}:{}/{}", self.addr.port(), self.token)
    }

    /// Stop the session: shut the listener down and delete the snapshot.
    ///
    /// Idempotent - calling it on an already-stopped session does
    /// nothing. Shutdown is best-effort with respect to in-flight
    /// requests; none are drained.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            let _ = handle.await;
        }
        self.remove_snapshot();
    }

    /// Stop the session synchronously (for use in Drop).
    fn stop_sync(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.server_handle.take() {
            handle.abort();
        }
        self.remove_snapshot();
    }

    fn remove_snapshot(&self) {
        match std::fs::remove_file(&self.snapshot_path) {
            Ok(()) => debug!(path = %self.snapshot_path.display(), "share snapshot deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.snapshot_path.display(),
                error = %e,
                "failed to delete share snapshot"
            ),
        }
    }
}

impl Drop for ShareServer {
    fn drop(&mut self) {
        self.stop_sync();
    }
}

/// Run the accept loop.
async fn run_server(listener: TcpListener, snapshot_dir: Arc<PathBuf>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let snapshot_dir = Arc::clone(&snapshot_dir);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service = service_fn(move |req: Request<Incoming>| {
                        let snapshot_dir = Arc::clone(&snapshot_dir);
                        async move { handle_request(&req, &snapshot_dir).await }
                    });

                    if let Err(e) = auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await
                    {
                        warn!(peer = %peer_addr, error = %e, "HTTP connection error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "failed to accept connection");
            }
        }
    }
}

/// Serve one request: the token path renders the snapshot, everything
/// else is a 404.
async fn handle_request(
    req: &Request<Incoming>,
    snapshot_dir: &Path,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.method() != Method::GET {
        return Ok(not_found());
    }

    let segment = req.uri().path().trim_start_matches('/');
    if !ShareToken::is_valid_segment(segment) {
        return Ok(not_found());
    }

    // The snapshot file is the single source of truth: once stop() has
    // deleted it, a still-draining connection can no longer serve it.
    let path = snapshot_dir.join(ShareSnapshot::file_name(segment));
    let json = match tokio::fs::read_to_string(&path).await {
        Ok(json) => json,
        Err(_) => return Ok(not_found()),
    };

    match serde_json::from_str::<ShareSnapshot>(&json) {
        Ok(snapshot) => {
            debug!(token = segment, "serving share page");
            let html = page::render(&snapshot);
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "text/html; charset=utf-8")
                .body(Full::new(Bytes::from(html)))
                .unwrap_or_else(|_| not_found()))
        }
        Err(e) => {
            error!(token = segment, error = %e, "corrupt share snapshot");
            let mut response = Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            Ok(response)
        }
    }
}

fn not_found() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        b"Share not found or expired",
    )));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// Best-effort discovery of this host's LAN address.
///
/// Opens a UDP socket towards a public address (no packets are sent) and
/// reads back the local address the OS picked. Falls back to loopback
/// when the host has no route.
pub fn local_ip() -> IpAddr {
    fn probe() -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip())
    }
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_all_interfaces_on_the_share_port() {
        let config = ServerConfig::default();
        assert_eq!(config.port, DEFAULT_SHARE_PORT);
        assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn local_ip_returns_something_routable_or_loopback() {
        // Must not panic regardless of the host's network setup.
        let _ = local_ip();
    }
}
