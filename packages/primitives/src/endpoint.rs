//! Transfer endpoint resolved by the tracker.
//!
//! When the tracker resolves a file request it hands back the `(address,
//! port)` pair the holding peer listens on for direct transfer connections.
//! The `Display` implementation renders the wire format of that reply:
//! the address and the port separated by one space, e.g. `127.0.0.1 54321`.
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The `(address, port)` pair a peer listens on to serve files directly to
/// other peers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct TransferEndpoint {
    pub ip: IpAddr,
    pub port: u16,
}

impl TransferEndpoint {
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for TransferEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ip, self.port)
    }
}

/// Error returned when a string does not contain a valid transfer endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTransferEndpointError {
    #[error("missing address or port in endpoint: {value}")]
    MissingField { value: String },
    #[error("invalid address in endpoint: {value}")]
    InvalidAddress { value: String },
    #[error("invalid port in endpoint: {value}")]
    InvalidPort { value: String },
}

impl FromStr for TransferEndpoint {
    type Err = ParseTransferEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        let (Some(ip), Some(port)) = (tokens.next(), tokens.next()) else {
            return Err(ParseTransferEndpointError::MissingField { value: s.to_owned() });
        };

        let ip = ip
            .parse::<IpAddr>()
            .map_err(|_| ParseTransferEndpointError::InvalidAddress { value: s.to_owned() })?;
        let port = port
            .parse::<u16>()
            .map_err(|_| ParseTransferEndpointError::InvalidPort { value: s.to_owned() })?;

        Ok(TransferEndpoint::new(ip, port))
    }
}
