//! Centralized constants for the placebook crate
//!
//! Values shared by more than one module live here.

/// External API endpoints
pub mod api {
    /// Google Geocoding API (JSON output)
    pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

    /// Google Static Maps API, used for place previews
    pub const GOOGLE_STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

    /// Language requested from the geocoder
    pub const GEOCODE_LANGUAGE: &str = "en";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Address resolution
pub mod address {
    /// Placeholder used when no address could be resolved
    pub const UNKNOWN_ADDRESS: &str = "unknown address";

    /// Address component type that carries the country
    pub const COUNTRY_COMPONENT: &str = "country";
}

/// Environment variables read at startup
pub mod env {
    /// Selects production or development credentials
    pub const ENVIRONMENT: &str = "PLACEBOOK_ENV";

    /// Production geocoding API key
    pub const GEOCODING_API_KEY: &str = "PLACEBOOK_GEOCODING_API_KEY";

    /// Production map API key
    pub const MAP_API_KEY: &str = "PLACEBOOK_MAP_API_KEY";
}

/// Storage keys
pub mod storage {
    /// Key under which the saved place list is stored
    pub const PLACES_KEY: &str = "places";
}
