use clap::Parser;
use tracing::info;

use bittrickle::{app, bootstrap};

/// The BitTrickle tracker daemon.
#[derive(Parser)]
#[command(name = "bittrickle", version, about = "BitTrickle peer discovery tracker")]
struct Args {
    /// UDP port the tracker listens on. It overrides the configured bind
    /// port.
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let (config, tracker) = bootstrap::app::setup(Some(args.port));

    let jobs = app::start(&config, tracker).await;

    // handle the signals
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("BitTrickle shutting down..");

            // Await for all jobs to shutdown
            futures::future::join_all(jobs).await;
            info!("BitTrickle successfully shutdown.");
        }
    }
}
