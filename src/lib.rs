//! placebook: Saved places with their address and country
//!
//! A library and CLI tool for saving geographic coordinates as places,
//! resolved to a human-readable address and a country flag through
//! reverse geocoding.
//!
//! ## Features
//!
//! - Reverse geocoding through the Google Geocoding API
//! - ISO 3166-1 alpha-2 country table with flag emoji
//! - Persistent, observable place list
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use placebook::geo::country;
//! use placebook::places::{Place, PlaceDraft, PlaceBook};
//! use placebook::store::MemoryStorage;
//! use placebook::Coordinates;
//! use std::sync::Arc;
//!
//! let france = country::resolve("fr").unwrap();
//! assert_eq!(france.name, "France");
//!
//! let book = PlaceBook::open(Arc::new(MemoryStorage::new()));
//! book.add(Place::new(PlaceDraft {
//!     address: Some("Champ de Mars, Paris".to_string()),
//!     country: Some(france.name.to_string()),
//!     flag_emoji: Some(france.emoji()),
//!     coords: Some(Coordinates::new(48.8584, 2.2945)),
//! }));
//! assert_eq!(book.len(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod places;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{AddressResolution, Coordinates};
pub use places::Place;
