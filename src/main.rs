//! placebook CLI entry point
//!
//! Saved places with their address and country - CLI + web app

use placebook::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
