//! The transfer client used to download a file from another peer.
use std::io;
use std::path::{Path, PathBuf};

use bittrickle_primitives::endpoint::TransferEndpoint;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{CHUNK_SIZE, NOT_FOUND_SENTINEL};

/// Error returned when a download does not produce a local copy.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not connect to peer {endpoint}: {source}")]
    Connect {
        endpoint: TransferEndpoint,
        source: io::Error,
    },

    #[error("could not send the file request: {source}")]
    Request { source: io::Error },

    #[error("the peer does not have the file: {filename}")]
    NotFound { filename: String },

    #[error("could not read the file bytes: {source}")]
    Read { source: io::Error },

    #[error("could not write the local copy {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// It downloads `filename` from the peer at `endpoint` into `dest_dir` and
/// returns the path of the local copy.
///
/// The first chunk is inspected before anything is persisted: when it is
/// exactly the not-found sentinel the download fails and no file is created.
/// After that, chunks are streamed to disk until the peer closes the
/// connection.
///
/// # Errors
///
/// Will return an `Error` if the peer is unreachable, the peer does not have
/// the file, or the local copy cannot be written.
pub async fn download(endpoint: &TransferEndpoint, filename: &str, dest_dir: &Path) -> Result<PathBuf, Error> {
    let mut stream = TcpStream::connect(endpoint.socket_addr())
        .await
        .map_err(|source| Error::Connect {
            endpoint: *endpoint,
            source,
        })?;

    stream
        .write_all(filename.as_bytes())
        .await
        .map_err(|source| Error::Request { source })?;

    let mut first_chunk = [0u8; CHUNK_SIZE];
    let first_size = stream.read(&mut first_chunk).await.map_err(|source| Error::Read { source })?;

    if &first_chunk[..first_size] == NOT_FOUND_SENTINEL {
        return Err(Error::NotFound {
            filename: filename.to_owned(),
        });
    }

    fs::create_dir_all(dest_dir).await.map_err(|source| Error::Write {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let path = dest_dir.join(filename);
    let write_error = |source| Error::Write {
        path: path.clone(),
        source,
    };

    let mut file = fs::File::create(&path).await.map_err(write_error)?;

    file.write_all(&first_chunk[..first_size]).await.map_err(write_error)?;

    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let size = stream.read(&mut chunk).await.map_err(|source| Error::Read { source })?;
        if size == 0 {
            break;
        }
        file.write_all(&chunk[..size]).await.map_err(write_error)?;
    }

    file.flush().await.map_err(write_error)?;

    Ok(path)
}
