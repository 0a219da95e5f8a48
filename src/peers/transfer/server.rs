//! The transfer server every authenticated peer runs.
//!
//! It listens on an ephemeral TCP port whose number is reported to the
//! tracker at authentication time. Inbound connections may arrive from many
//! peers at once; each one is served independently in its own task.
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use super::{CHUNK_SIZE, NOT_FOUND_SENTINEL, TRANSFER_LOG_TARGET};

/// The TCP listener serving this peer's published files.
pub struct TransferServer {
    listener: TcpListener,
}

impl TransferServer {
    /// Binds to an ephemeral TCP port on all interfaces.
    ///
    /// # Errors
    ///
    /// Will return an error if the listener cannot be bound.
    pub async fn bind() -> io::Result<TransferServer> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;

        Ok(TransferServer { listener })
    }

    /// The bound address; its port is what `auth` reports to the tracker.
    ///
    /// # Errors
    ///
    /// Will return an error if the underlying call fails.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The accept loop. Each connection is served concurrently; a failed
    /// transfer is logged and never stops the listener.
    pub async fn run(self, shared_dir: PathBuf) {
        loop {
            match self.listener.accept().await {
                Ok((stream, from)) => {
                    debug!(target: TRANSFER_LOG_TARGET, "Transfer connection from {from}");

                    let shared_dir = shared_dir.clone();
                    drop(tokio::task::spawn(async move {
                        if let Err(e) = serve_connection(stream, &shared_dir).await {
                            warn!(target: TRANSFER_LOG_TARGET, "Transfer to {from} failed: {e}");
                        }
                    }));
                }
                Err(e) => {
                    warn!(target: TRANSFER_LOG_TARGET, "Accept failed: {e}");
                }
            }
        }
    }
}

/// It serves one transfer connection: a single bounded read for the filename
/// request, then the file bytes in fixed-size chunks, or the not-found
/// sentinel. Completion is signalled by closing the connection.
async fn serve_connection(mut stream: TcpStream, shared_dir: &Path) -> io::Result<()> {
    let mut request = [0u8; CHUNK_SIZE];
    let size = stream.read(&mut request).await?;

    let filename = String::from_utf8_lossy(&request[..size]);

    let Some(path) = resolve_request_path(shared_dir, filename.trim()) else {
        stream.write_all(NOT_FOUND_SENTINEL).await?;
        return Ok(());
    };

    if !fs::metadata(&path).await.map(|metadata| metadata.is_file()).unwrap_or(false) {
        stream.write_all(NOT_FOUND_SENTINEL).await?;
        return Ok(());
    }

    let mut file = fs::File::open(&path).await?;
    let mut chunk = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut chunk).await?;
        if bytes_read == 0 {
            break;
        }
        stream.write_all(&chunk[..bytes_read]).await?;
    }

    Ok(())
}

/// It resolves a requested filename inside the shared directory. Requests
/// that name a path instead of a plain filename are rejected.
fn resolve_request_path(shared_dir: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty() || filename == "." || filename == ".." || filename.contains(['/', '\\']) {
        return None;
    }

    Some(shared_dir.join(filename))
}
