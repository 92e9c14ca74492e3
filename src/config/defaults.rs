//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Geocoding key used outside production
pub const DEV_GEOCODING_API_KEY: &str = "placebook-dev-geocoding-key";

/// Map key used outside production
pub const DEV_MAP_API_KEY: &str = "placebook-dev-map-key";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "placebook";
