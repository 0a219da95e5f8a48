//! The BitTrickle peer console application binary.
use bittrickle::console::peer::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
