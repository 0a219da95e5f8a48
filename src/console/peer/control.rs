//! UDP control-protocol client used by the peer console.
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use bittrickle_primitives::username::Username;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::servers::udp::MAX_PACKET_SIZE;

/// A connected control-protocol client.
///
/// Commands are strict request/response: one datagram out, one reply awaited
/// before the next command is issued. Heartbeats share the socket but expect
/// no reply, so they can be sent from a concurrent task without stealing a
/// command's response.
#[derive(Debug, Clone)]
pub struct ControlClient {
    socket: Arc<UdpSocket>,
}

impl ControlClient {
    /// Binds an ephemeral local socket and connects it to the tracker.
    ///
    /// # Errors
    ///
    /// Will return an error if the local socket can't be bound or connected.
    pub async fn connect(tracker_addr: SocketAddr) -> io::Result<ControlClient> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;

        socket.connect(tracker_addr).await?;

        Ok(ControlClient {
            socket: Arc::new(socket),
        })
    }

    /// Sends one command line and awaits the single reply.
    ///
    /// There is deliberately no timeout here: the round-trip blocks until
    /// the reply or a socket error arrives.
    ///
    /// # Errors
    ///
    /// Will return an error if the datagram can't be sent or received.
    pub async fn send_command(&self, command: &str) -> io::Result<String> {
        debug!("Sending command: {command}");

        self.socket.send(command.as_bytes()).await?;

        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let size = self.socket.recv(&mut buffer).await?;

        Ok(String::from_utf8_lossy(&buffer[..size]).into_owned())
    }

    /// Sends a heartbeat. No reply is expected.
    ///
    /// # Errors
    ///
    /// Will return an error if the datagram can't be sent.
    pub async fn send_heartbeat(&self, username: &Username) -> io::Result<()> {
        self.socket.send(format!("heartbeat {username}").as_bytes()).await?;

        Ok(())
    }
}
