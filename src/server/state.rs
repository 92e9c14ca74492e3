//! Server shared state
//!
//! Holds configuration and the services the handlers use.

use crate::config::{ApiCredentials, Config};
use crate::geo::google::GoogleGeocoder;
use crate::geo::ip_location::IpLocator;
use crate::places::PlaceBook;
use crate::store::StorageBackend;
use std::sync::Arc;

/// Shared state for the HTTP server
#[derive(Debug)]
pub struct AppState {
    pub config: Config,

    /// Credentials resolved once at startup
    pub credentials: ApiCredentials,

    pub geocoder: GoogleGeocoder,

    pub locator: IpLocator,

    pub places: PlaceBook,
}

impl AppState {
    /// Create application state, resolving credentials from the environment
    pub fn new(config: Config, backend: Arc<dyn StorageBackend>) -> Self {
        let credentials = config.credentials();
        let geocoder = GoogleGeocoder::from_config(&config, &credentials);
        Self::with_services(config, credentials, geocoder, IpLocator::new(), backend)
    }

    /// Create application state from explicit parts
    pub fn with_services(
        config: Config,
        credentials: ApiCredentials,
        geocoder: GoogleGeocoder,
        locator: IpLocator,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            config,
            credentials,
            geocoder,
            locator,
            places: PlaceBook::open(backend),
        }
    }
}
