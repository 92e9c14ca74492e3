//! Current position lookup
//!
//! The current position comes from a [`PositionSource`]. The default source
//! asks ip-api.com where the caller's IP address is. Lookups are never cached.

use crate::constants::api::IP_API_URL;
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// Something that can report the current position
pub trait PositionSource: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}

/// Get the current coordinates, or `(0, 0)` if the position is unavailable
///
/// The fallback is silent: callers cannot tell it from a real position at
/// the origin.
pub async fn current_coordinates<P: PositionSource>(source: &P) -> Coordinates {
    match source.current_position().await {
        Ok(coords) => coords,
        Err(e) => {
            debug!("Current position unavailable, using origin: {}", e);
            Coordinates::default()
        }
    }
}

/// IP-based position source
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    endpoint: String,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl IpLocator {
    /// Create a locator against ip-api.com
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL)
    }

    /// Create a locator against a specific endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn fetch_position(&self) -> Result<Coordinates> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::Geolocation(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geolocation(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            Error::Geolocation(format!("Failed to parse IP location response: {}", e))
        })?;

        Self::coordinates_from(data)
    }

    fn coordinates_from(data: IpApiResponse) -> Result<Coordinates> {
        if data.status != "success" {
            let reason = data.message.unwrap_or_else(|| "unknown reason".to_string());
            return Err(Error::Geolocation(format!("IP location lookup failed: {}", reason)));
        }

        let lat = data
            .lat
            .ok_or_else(|| Error::Geolocation("No latitude in response".to_string()))?;
        let lng = data
            .lon
            .ok_or_else(|| Error::Geolocation("No longitude in response".to_string()))?;

        Ok(Coordinates::new(lat, lng))
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSource for IpLocator {
    async fn current_position(&self) -> Result<Coordinates> {
        self.fetch_position().await
    }
}

/// A position source that always reports the same coordinates
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.0)
    }
}
