//! Module to handle the UDP server instances.
//!
//! There are two main types in this module:
//!
//! - [`UdpServer`]: a controller to start and stop the server.
//! - [`Udp`]: the server launcher.
//!
//! The `UdpServer` is an state machine for a given configuration. This struct
//! represents concrete configuration and state. It allows to start and stop
//! the server but always keeping the same configuration.
//!
//! The `Udp` is the server launcher. It's responsible for launching the UDP
//! service but without keeping any state.
//!
//! Each inbound datagram is handled in its own spawned task; the atomicity
//! of command handling comes from the single lock inside the core tracker,
//! not from the delivery layer.
use std::net::SocketAddr;
use std::sync::Arc;

use derive_more::Constructor;
use tokio::net::UdpSocket;
use tokio::select;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use super::response::Response;
use super::{handlers, RawRequest, MAX_PACKET_SIZE, UDP_TRACKER_LOG_TARGET};
use crate::bootstrap::jobs::Started;
use crate::core::Tracker;
use crate::servers::signals::{shutdown_signal_with_message, Halted};

/// Error that can occur when starting or stopping the UDP server.
///
/// Some errors triggered while starting the server are:
///
/// - The server cannot bind to the given address.
/// - It cannot get the bound address.
///
/// Some errors triggered while stopping the server are:
///
/// - The [`UdpServer`] cannot send the shutdown signal to the spawned UDP
///   service thread.
#[derive(Debug)]
pub enum UdpError {
    /// Any kind of error starting or stopping the server.
    Socket(std::io::Error),
    Error(String),
}

/// A UDP server instance controller with no UDP instance running.
#[allow(clippy::module_name_repetitions)]
pub type StoppedUdpServer = UdpServer<Stopped>;

/// A UDP server instance controller with a running UDP instance.
#[allow(clippy::module_name_repetitions)]
pub type RunningUdpServer = UdpServer<Running>;

/// A UDP server instance controller.
///
/// It's responsible for:
///
/// - Keeping the initial configuration of the server.
/// - Starting and stopping the server.
/// - Keeping the state of the server: `running` or `stopped`.
pub struct UdpServer<S> {
    /// The state of the server: `running` or `stopped`.
    pub state: S,
}

/// A stopped UDP server state.
pub struct Stopped {
    pub launcher: Launcher,
}

/// A running UDP server state.
#[derive(Debug)]
pub struct Running {
    /// The address where the server is bound.
    pub binding: SocketAddr,
    pub halt_task: oneshot::Sender<Halted>,
    pub task: JoinHandle<Launcher>,
}

impl UdpServer<Stopped> {
    /// Creates a new `UdpServer` instance in `stopped` state.
    #[must_use]
    pub fn new(launcher: Launcher) -> Self {
        Self {
            state: Stopped { launcher },
        }
    }

    /// It starts the server and returns a `UdpServer` controller in `running`
    /// state.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the UDP service can't bind to the given address.
    ///
    /// # Panics
    ///
    /// It panics if unable to receive the bound socket address from the
    /// service.
    pub async fn start(self, tracker: Arc<Tracker>) -> Result<UdpServer<Running>, std::io::Error> {
        let (tx_start, rx_start) = oneshot::channel::<Started>();
        let (tx_halt, rx_halt) = oneshot::channel::<Halted>();

        let task = self.state.launcher.start(tracker, tx_start, rx_halt);

        let binding = rx_start.await.expect("it should be able to start the service").address;

        trace!(target: UDP_TRACKER_LOG_TARGET, "UdpServer<Stopped>::start: (running on udp://{binding})");

        Ok(UdpServer {
            state: Running {
                binding,
                halt_task: tx_halt,
                task,
            },
        })
    }
}

impl UdpServer<Running> {
    /// It stops the server and returns a `UdpServer` controller in `stopped`
    /// state.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the oneshot channel to send the stop signal has
    /// already been called once, or the service task failed.
    pub async fn stop(self) -> Result<UdpServer<Stopped>, UdpError> {
        self.state
            .halt_task
            .send(Halted::Normal)
            .map_err(|e| UdpError::Error(e.to_string()))?;

        let launcher = self.state.task.await.map_err(|e| UdpError::Error(e.to_string()))?;

        Ok(UdpServer {
            state: Stopped { launcher },
        })
    }
}

/// A UDP server instance launcher: the bind address and nothing else.
#[derive(Constructor, Copy, Clone, Debug)]
pub struct Launcher {
    pub bind_to: SocketAddr,
}

impl Launcher {
    /// It starts the UDP server instance in a spawned task.
    pub fn start(
        &self,
        tracker: Arc<Tracker>,
        tx_start: oneshot::Sender<Started>,
        rx_halt: oneshot::Receiver<Halted>,
    ) -> JoinHandle<Launcher> {
        let launcher = Launcher::new(self.bind_to);

        tokio::spawn(async move {
            Udp::run_with_graceful_shutdown(tracker, launcher.bind_to, tx_start, rx_halt).await;
            launcher
        })
    }
}

/// The UDP server launcher. It's responsible for launching the UDP service
/// but without keeping any state.
pub struct Udp;

impl Udp {
    /// It starts the UDP service with graceful shutdown.
    ///
    /// # Panics
    ///
    /// It panics if unable to bind to the udp socket, get the address from
    /// the bound socket, or send the address of the bound socket.
    async fn run_with_graceful_shutdown(
        tracker: Arc<Tracker>,
        bind_to: SocketAddr,
        tx_start: oneshot::Sender<Started>,
        rx_halt: oneshot::Receiver<Halted>,
    ) {
        let socket = UdpSocket::bind(bind_to)
            .await
            .expect("it should be able to bind the udp tracker socket");

        let address = socket.local_addr().expect("it should be able to get the bound address");
        let socket = Arc::new(socket);

        info!(target: UDP_TRACKER_LOG_TARGET, "Starting on: udp://{address}");

        let halt_task = tokio::task::spawn(shutdown_signal_with_message(
            rx_halt,
            format!("Halting UDP service bound to socket: {address}"),
        ));

        let running = {
            let socket = socket.clone();
            tokio::task::spawn(async move {
                debug!(target: UDP_TRACKER_LOG_TARGET, "Udp::run_with_graceful_shutdown::task (listening on udp://{address})");
                Udp::run_udp_server_main(&socket, &tracker).await;
            })
        };

        tx_start
            .send(Started { address })
            .expect("the UDP tracker service should not be dropped");

        let stop = running.abort_handle();

        select! {
            _ = running => { debug!(target: UDP_TRACKER_LOG_TARGET, "Udp::run_with_graceful_shutdown (stopped)"); },
            _ = halt_task => { debug!(target: UDP_TRACKER_LOG_TARGET, "Udp::run_with_graceful_shutdown (halting)"); }
        }
        stop.abort();

        tokio::task::yield_now().await; // lets allow the other tasks to complete.
    }

    /// The main receive loop. One task per datagram; the datagram buffer is
    /// reused between iterations.
    async fn run_udp_server_main(socket: &Arc<UdpSocket>, tracker: &Arc<Tracker>) {
        let mut buffer = [0; MAX_PACKET_SIZE];

        loop {
            match socket.recv_from(&mut buffer).await {
                Ok((size, from)) => {
                    trace!(target: UDP_TRACKER_LOG_TARGET, "Udp::run_udp_server::loop ({size} bytes from {from})");

                    let request = RawRequest {
                        payload: buffer[..size].to_vec(),
                        from,
                    };

                    let tracker = tracker.clone();
                    let socket = socket.clone();
                    drop(tokio::task::spawn(async move {
                        Udp::process_request(request, &tracker, &socket).await;
                    }));
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    trace!(target: UDP_TRACKER_LOG_TARGET, err = %e, "Udp::run_udp_server::loop (interrupted)");
                }
                Err(e) => {
                    error!(target: UDP_TRACKER_LOG_TARGET, err = %e, "Udp::run_udp_server::loop break: (got error)");
                    break;
                }
            }
        }
    }

    async fn process_request(request: RawRequest, tracker: &Arc<Tracker>, socket: &Arc<UdpSocket>) {
        let from = request.from;

        match handlers::handle_packet(request, tracker).await {
            Some(response) => Self::send_response(socket, from, &response).await,
            None => trace!(target: UDP_TRACKER_LOG_TARGET, "Udp::process_request (no response for {from})"),
        }
    }

    async fn send_response(socket: &Arc<UdpSocket>, to: SocketAddr, response: &Response) {
        let payload = response.to_bytes();

        debug!(target: UDP_TRACKER_LOG_TARGET, ?to, bytes_count = payload.len(), "Udp::send_response (sending)");

        // doesn't matter if it reaches or not
        drop(socket.send_to(&payload, to).await);
    }
}
