//! HTTP server for placebook
//!
//! Serves the list and edit views plus a JSON API over the saved places.

pub mod routes;
pub mod state;
pub mod views;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::StorageBackend;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server on the configured address
///
/// Never returns unless the server shuts down
pub async fn run(config: Config, backend: Arc<dyn StorageBackend>) -> Result<()> {
    let addr = config.server_addr();
    serve(&addr, AppState::new(config, backend)).await
}

/// Start the HTTP server with prepared state on a specific address
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let app = create_router(Arc::new(state));

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
