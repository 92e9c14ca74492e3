//! Error types for placebook

use thiserror::Error;

/// Main error type for placebook operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Geolocation error: {0}")]
    Geolocation(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for placebook operations
pub type Result<T> = std::result::Result<T, Error>;
