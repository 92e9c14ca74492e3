//! Geocoding module
//!
//! Provides reverse geocoding (coordinates to address and country) and
//! current-position lookup.

pub mod country;
pub mod google;
pub mod ip_location;

use crate::constants::address::UNKNOWN_ADDRESS;
use crate::error::{Error, Result};
use country::Country;
use serde::{Deserialize, Deserializer, Serialize};
use std::future::Future;

/// A geographic coordinate pair
///
/// Ranges are not checked. Input from users goes through
/// [`Coordinates::checked`], which only rejects non-finite values.
///
/// JSON has no NaN or infinity; serde_json writes them as `null`, so `null`
/// reads back as NaN instead of failing the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(deserialize_with = "number_or_nan")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub lng: f64,
}

fn number_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create coordinates, rejecting NaN and infinite values
    pub fn checked(lat: f64, lng: f64) -> Result<Self> {
        Self::new(lat, lng).validated()
    }

    /// `self` if both values are finite
    pub fn validated(self) -> Result<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(Error::InvalidCoordinates(format!(
                "lat={}, lng={}",
                self.lat, self.lng
            )))
        }
    }

    /// Whether both values are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// The `"lat,lng"` form used in geocoding requests
    pub fn latlng(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Best-effort address for a coordinate pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResolution {
    /// Formatted address, or `"unknown address"`
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_emoji: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressResolution {
    /// The resolution used when nothing could be resolved
    pub fn unknown() -> Self {
        Self {
            address: UNKNOWN_ADDRESS.to_string(),
            flag_emoji: None,
            country: None,
        }
    }

    /// Whether the address is the unknown placeholder
    pub fn is_unknown(&self) -> bool {
        self.address == UNKNOWN_ADDRESS
    }
}

impl Default for AddressResolution {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Data extracted from the first geocoding result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    /// `formatted_address`, if the result carried one
    pub address: Option<String>,
    /// Country from the first `country` address component
    pub country: Option<Country>,
}

/// Outcome of a single reverse geocoding lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressLookup {
    Found(ResolvedAddress),
    /// The service answered but had no result for the coordinates
    NotFound,
    /// The request or the response parsing failed
    Failed(String),
}

impl AddressLookup {
    /// Collapse the lookup into an address, filling in defaults
    pub fn into_resolution(self) -> AddressResolution {
        match self {
            Self::Found(found) => {
                let mut resolution = AddressResolution {
                    address: found.address.unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
                    ..AddressResolution::unknown()
                };
                if let Some(country) = found.country {
                    resolution.country = Some(country.name.to_string());
                    resolution.flag_emoji = Some(country.emoji());
                }
                resolution
            }
            Self::NotFound | Self::Failed(_) => AddressResolution::unknown(),
        }
    }
}

/// Trait for reverse geocoding backends
pub trait ReverseGeocoder: Send + Sync {
    /// Look up the address for a coordinate pair
    ///
    /// Never errors; failures are reported as [`AddressLookup::Failed`].
    fn lookup(&self, coords: Coordinates) -> impl Future<Output = AddressLookup> + Send;

    /// Resolve a coordinate pair to an address, defaulting on any failure
    fn resolve_address(
        &self,
        coords: Coordinates,
    ) -> impl Future<Output = AddressResolution> + Send {
        async move { self.lookup(coords).await.into_resolution() }
    }
}
