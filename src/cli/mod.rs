//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod add;
pub mod config;
pub mod places;
pub mod resolve;
pub mod serve;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::ip_location::{current_coordinates, IpLocator};
use crate::geo::Coordinates;
use crate::places::PlaceBook;
use crate::store::{FileStorage, StorageBackend};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Save places by their address and country
#[derive(Parser)]
#[command(name = "placebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve coordinates and save them as a place
    Add(add::AddArgs),

    /// View and manage saved places
    Places(places::PlacesArgs),

    /// Resolve coordinates to an address without saving
    Resolve(resolve::ResolveArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Where a command gets its coordinates
#[derive(Args, Debug)]
pub struct LocationArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Use current location (IP geolocation)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub here: bool,
}

impl LocationArgs {
    /// The requested coordinates
    pub async fn coordinates(&self) -> Result<Coordinates> {
        if self.here {
            let coords = current_coordinates(&IpLocator::new()).await;
            eprintln!("Using current location: {}", coords);
            return Ok(coords);
        }

        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinates::checked(lat, lng),
            _ => Err(Error::Config(
                "No location specified. Use --lat/--lng or --here".to_string(),
            )),
        }
    }
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_logging(default_level);

    match cli.command {
        Commands::Add(args) => add::run(args).await,
        Commands::Places(args) => places::run(args),
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize tracing, honouring `RUST_LOG` when set
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Open the file-backed place list for a configuration
pub(crate) fn open_place_book(config: &Config) -> Result<PlaceBook> {
    let backend: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(config.storage_dir()?));
    Ok(PlaceBook::open(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(args: &[&str]) -> LocationArgs {
        let mut argv = vec!["placebook", "resolve"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Resolve(args) => args.location,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_location_from_flags() {
        let coords = location(&["--lat", "-33.87", "--lng", "151.21"])
            .coordinates()
            .await
            .unwrap();
        assert_eq!(coords, Coordinates::new(-33.87, 151.21));
    }

    #[tokio::test]
    async fn test_location_rejects_non_finite() {
        let result = location(&["--lat", "NaN", "--lng", "1"]).coordinates().await;
        assert!(matches!(result, Err(Error::InvalidCoordinates(_))));

        let result = location(&["--lat", "1", "--lng", "inf"]).coordinates().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_location_required() {
        let result = location(&[]).coordinates().await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
