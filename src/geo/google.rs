//! Google Geocoding backend
//!
//! Reverse geocodes a coordinate pair through the Google Geocoding API.
//! Only the first result is used: its `formatted_address` and the first
//! address component typed `country`.

use crate::config::{ApiCredentials, Config};
use crate::constants::address::COUNTRY_COMPONENT;
use crate::constants::api::{GEOCODE_LANGUAGE, GOOGLE_GEOCODE_URL};
use crate::error::{Error, Result};
use crate::geo::country;
use crate::geo::{AddressLookup, Coordinates, ResolvedAddress, ReverseGeocoder};
use serde::Deserialize;
use tracing::{debug, warn};

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Google geocoding backend
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Geocoding API response body
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    #[serde(default)]
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GoogleGeocoder {
    /// Create a geocoder against the public Google endpoint
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(GOOGLE_GEOCODE_URL, api_key)
    }

    /// Create a geocoder against a specific endpoint
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("No geocoding API key configured, lookups will be rejected");
        }

        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Create a geocoder from configuration and resolved credentials
    pub fn from_config(config: &Config, credentials: &ApiCredentials) -> Self {
        Self::with_base_url(
            config.geocoding.base_url.clone(),
            credentials.geocoding_api_key.clone(),
        )
    }

    /// Build the request URL for a coordinate pair
    pub fn request_url(&self, coords: Coordinates) -> String {
        format!(
            "{}?language={}&latlng={}&key={}",
            self.base_url,
            GEOCODE_LANGUAGE,
            urlencoding::encode(&coords.latlng()),
            urlencoding::encode(self.api_key.as_deref().unwrap_or_default())
        )
    }

    async fn fetch(&self, coords: Coordinates) -> Result<GeocodeResponse> {
        let response = self
            .client
            .get(self.request_url(coords))
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Geocoding service returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse geocoding response: {}", e)))
    }

    /// Pull the address and country out of a geocoding response
    pub fn extract(response: GeocodeResponse) -> AddressLookup {
        match response.status.as_deref() {
            None | Some(STATUS_OK) | Some(STATUS_ZERO_RESULTS) => {}
            Some(status) => {
                let detail = response.error_message.unwrap_or_default();
                return AddressLookup::Failed(format!("{} {}", status, detail).trim().to_string());
            }
        }

        let Some(first) = response.results.into_iter().next() else {
            return AddressLookup::NotFound;
        };

        let country = first
            .address_components
            .iter()
            .find(|component| component.types.iter().any(|t| t == COUNTRY_COMPONENT))
            .and_then(|component| {
                let resolved = country::resolve(&component.short_name);
                if resolved.is_none() {
                    debug!("Unrecognised country code: {}", component.short_name);
                }
                resolved
            });

        AddressLookup::Found(ResolvedAddress {
            address: first.formatted_address,
            country,
        })
    }
}

impl Default for GoogleGeocoder {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ReverseGeocoder for GoogleGeocoder {
    async fn lookup(&self, coords: Coordinates) -> AddressLookup {
        let lookup = match self.fetch(coords).await {
            Ok(response) => Self::extract(response),
            Err(e) => AddressLookup::Failed(e.to_string()),
        };

        if let AddressLookup::Failed(reason) = &lookup {
            warn!("Address lookup for {} failed: {}", coords.latlng(), reason);
        }

        lookup
    }
}
