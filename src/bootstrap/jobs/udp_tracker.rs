//! UDP tracker job starter.
//!
//! The [`udp_tracker::start_job`](crate::bootstrap::jobs::udp_tracker::start_job)
//! function starts the UDP control server.
use std::sync::Arc;

use bittrickle_configuration::UdpTracker;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core::Tracker;
use crate::servers::udp::server::{Launcher, UdpServer};

/// It starts the UDP control server with the provided configuration and
/// keeps it running until it halts.
///
/// # Panics
///
/// It panics if the server can't bind to the configured address.
#[must_use]
pub async fn start_job(config: &UdpTracker, tracker: Arc<Tracker>) -> JoinHandle<()> {
    let server = UdpServer::new(Launcher::new(config.bind_address))
        .start(tracker)
        .await
        .expect("it should be able to start the udp tracker");

    info!("Running UDP tracker on: udp://{}", server.state.binding);

    tokio::spawn(async move {
        // the running server is moved in whole so the halt channel stays
        // open for the lifetime of the job
        let running = server;

        drop(running.state.task.await);
    })
}
