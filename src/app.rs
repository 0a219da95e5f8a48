//! BitTrickle tracker application.
//!
//! The application is a container for the configuration and the service
//! jobs. It wires the domain layer (the core tracker) to the delivery layer
//! (the UDP control server) and returns the handles of the running jobs so
//! the caller can await them on shutdown.
use std::sync::Arc;

use bittrickle_configuration::Configuration;
use tokio::task::JoinHandle;

use crate::bootstrap::jobs::udp_tracker;
use crate::core;

/// It starts the application services.
pub async fn start(config: &Configuration, tracker: Arc<core::Tracker>) -> Vec<JoinHandle<()>> {
    let mut jobs: Vec<JoinHandle<()>> = Vec::new();

    // Start the UDP control server
    jobs.push(udp_tracker::start_job(&config.udp_tracker, tracker.clone()).await);

    jobs
}
