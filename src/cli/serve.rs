//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::config::Config;
use crate::error::Result;
use crate::server;
use crate::store::{FileStorage, MemoryStorage, StorageBackend};
use clap::Args;
use std::sync::Arc;
use tracing::info;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Keep places in memory only
    #[arg(long)]
    pub ephemeral: bool,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let backend: Arc<dyn StorageBackend> = if args.ephemeral {
        info!("Places are kept in memory only");
        Arc::new(MemoryStorage::new())
    } else {
        let dir = config.storage_dir()?;
        info!("Storing places in {}", dir.display());
        Arc::new(FileStorage::new(dir))
    };

    let environment = config.environment();
    info!(
        "Starting placebook server v{} ({}) on {}",
        env!("CARGO_PKG_VERSION"),
        environment,
        config.server_addr()
    );

    server::run(config, backend).await
}
