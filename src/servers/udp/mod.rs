//! UDP control server for the tracker.
//!
//! The control protocol is connectionless, line-oriented text: one datagram
//! carries one space-separated command line, and the reply (when there is
//! one) is a single datagram with the response text.
//!
//! | Command | Args | Response |
//! |---|---|---|
//! | `auth` | username password transfer_port | `Authentication Success` or a failure reason |
//! | `heartbeat` | username | none |
//! | `get` | filename | `<ip> <port>` or `File not found` |
//! | `lap` | | the active peers or `No active peers` |
//! | `lpf` | | the caller's published files or `No published files` |
//! | `pub` | filename | `File published successfully` |
//! | `sch` | substring | the matching files or `No files found` |
//! | `unp` | filename | `File unpublished successfully` or `File unpublication failed` |
//! | `xit` | | `Goodbye!` |
//!
//! Identity is the datagram's source address: every command after `auth` is
//! attributed to the session that authenticated from that address. Unknown
//! commands and malformed datagrams are answered with `Invalid command.`;
//! they never terminate the server.
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

use std::net::SocketAddr;

/// Maximum size of an inbound control datagram. Command lines are short;
/// anything longer is cut off and will fail to parse.
pub const MAX_PACKET_SIZE: usize = 1024;

/// Log target the UDP control server traces under.
pub const UDP_TRACKER_LOG_TARGET: &str = "UDP TRACKER";

/// A raw inbound datagram and the address it came from.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub payload: Vec<u8>,
    pub from: SocketAddr,
}
