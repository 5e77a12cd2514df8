/// Main entry point for the exchange binary
///
/// A thin wrapper; the bootstrap lives in `interfaces::cli`.

use exchange_engine::interfaces::cli;

#[tokio::main]
async fn main() {
    cli::run().await;
}
