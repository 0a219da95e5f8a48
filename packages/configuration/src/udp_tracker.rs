use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Configuration for the UDP control server.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct UdpTracker {
    /// The address the UDP control server binds to. Use port `0` to bind to
    /// a random free port.
    #[serde(default = "UdpTracker::default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for UdpTracker {
    fn default() -> Self {
        Self {
            bind_address: Self::default_bind_address(),
        }
    }
}

impl UdpTracker {
    fn default_bind_address() -> SocketAddr {
        "0.0.0.0:6969".parse().expect("the default bind address should be valid")
    }
}
