//! The peer-to-peer transfer contract.
//!
//! A transfer is one short-lived TCP connection:
//!
//! 1. The downloader connects to the holder's transfer endpoint (resolved by
//!    the tracker) and sends the filename as a single request.
//! 2. The holder either streams the file's bytes in fixed-size chunks until
//!    EOF, or sends the literal sentinel `File not found`.
//! 3. The holder closes the connection. There is no end-of-stream marker on
//!    the success path; the downloader detects completion by the close.
//!
//! The sentinel travels as ordinary payload bytes, so a real file whose
//! content starts with exactly those bytes is indistinguishable from a
//! not-found reply. That ambiguity is part of the wire contract and is kept
//! as-is.
pub mod client;
pub mod server;

/// Size of one transfer chunk on the wire. It also bounds the single read
/// for the filename request, which is short.
pub const CHUNK_SIZE: usize = 1024;

/// Literal payload sent instead of file bytes when the requested file does
/// not exist under the holder's shared directory.
pub const NOT_FOUND_SENTINEL: &[u8] = b"File not found";

/// Log target the peer transfer server traces under.
pub const TRANSFER_LOG_TARGET: &str = "PEER TRANSFER";
