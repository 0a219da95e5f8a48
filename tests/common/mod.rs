//! Shared fixtures for the integration tests: an ephemeral tracker instance
//! and a control-protocol test client.
//!
//! Each test binary compiles this module on its own, so not every helper is
//! exercised by every binary.
#![allow(dead_code)]
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bittrickle::core::Tracker;
use bittrickle::servers::udp::server::{Launcher, RunningUdpServer, UdpServer};
use bittrickle_configuration::Configuration;
use bittrickle_test_helpers::random;
use tokio::net::UdpSocket;
use tokio::time;

/// How long a test client waits for a tracker reply. The protocol itself has
/// no round-trip timeout; this one only keeps a broken test from hanging.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A running ephemeral tracker instance.
pub struct TestTracker {
    pub binding: SocketAddr,
    pub server: RunningUdpServer,
}

pub async fn start_default_tracker() -> TestTracker {
    start_tracker(bittrickle_test_helpers::configuration::ephemeral()).await
}

pub async fn start_tracker(configuration: Configuration) -> TestTracker {
    let tracker = Arc::new(Tracker::new(&configuration).expect("the ephemeral credentials file should load"));

    let server = UdpServer::new(Launcher::new(configuration.udp_tracker.bind_address))
        .start(tracker)
        .await
        .expect("the udp tracker should start");

    TestTracker {
        binding: server.state.binding,
        server,
    }
}

/// A UDP control-protocol test client bound to its own ephemeral port, so
/// every client is a distinct identity for the tracker.
pub struct Client {
    socket: UdpSocket,
}

impl Client {
    pub async fn connect(remote: SocketAddr) -> Client {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("the test client should bind");

        socket.connect(remote).await.expect("the test client should connect");

        Client { socket }
    }

    /// Sends a raw payload without awaiting a reply.
    pub async fn send(&self, payload: &[u8]) {
        self.socket.send(payload).await.expect("the test client should send");
    }

    /// Sends one command line and awaits the reply.
    pub async fn request(&self, command: &str) -> String {
        self.send(command.as_bytes()).await;
        self.receive().await
    }

    pub async fn receive(&self) -> String {
        let mut buffer = [0u8; 1024];

        let size = time::timeout(RECV_TIMEOUT, self.socket.recv(&mut buffer))
            .await
            .expect("the tracker should reply within the timeout")
            .expect("the test client should receive");

        String::from_utf8_lossy(&buffer[..size]).into_owned()
    }

    pub async fn authenticate(&self, username: &str, password: &str, transfer_port: u16) -> String {
        self.request(&format!("auth {username} {password} {transfer_port}")).await
    }
}

/// A fresh directory under the system temp dir.
pub fn temp_dir(tag: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("bittrickle_{tag}_{}", random::string(12)));

    std::fs::create_dir_all(&path).expect("the temp dir should be created");

    path
}
