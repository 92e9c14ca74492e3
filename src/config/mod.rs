//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/placebook/config.toml
//!
//! API credentials are resolved once from the runtime environment and handed
//! to the components that need them.

pub mod defaults;

use crate::constants::api::GOOGLE_GEOCODE_URL;
use crate::constants::env as env_vars;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deployment environment, selects where credentials come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Detect the environment from `PLACEBOOK_ENV`
    ///
    /// Anything other than a recognised production value is development.
    pub fn detect() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Detect the environment using a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(env_vars::ENVIRONMENT)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

/// Credentials for the external map services
///
/// Production keys are read from the process environment and are not
/// validated; a missing variable stays `None` and is passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub geocoding_api_key: Option<String>,
    pub map_api_key: Option<String>,
}

impl ApiCredentials {
    /// Resolve credentials for the given environment from process variables
    pub fn resolve(environment: Environment) -> Self {
        Self::from_lookup(environment, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using a custom variable lookup
    pub fn from_lookup<F>(environment: Environment, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match environment {
            Environment::Production => Self {
                geocoding_api_key: lookup(env_vars::GEOCODING_API_KEY),
                map_api_key: lookup(env_vars::MAP_API_KEY),
            },
            Environment::Development => Self {
                geocoding_api_key: Some(DEV_GEOCODING_API_KEY.to_string()),
                map_api_key: Some(DEV_MAP_API_KEY.to_string()),
            },
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Forces an environment instead of detecting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Where saved places are kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Geocoding service settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Explicit API keys, override the environment when non-empty
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Storage directory; empty means the XDG data directory
    #[serde(default)]
    pub dir: String,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Geocoding endpoint
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// Google geocoding key
    #[serde(default)]
    pub geocoding: String,

    /// Google maps key
    #[serde(default)]
    pub map: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_geocoding_url() -> String {
    GOOGLE_GEOCODE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// The environment in effect: configured, or detected from the process
    pub fn environment(&self) -> Environment {
        self.environment.unwrap_or_else(Environment::detect)
    }

    /// Resolve the API credentials for this configuration
    pub fn credentials(&self) -> ApiCredentials {
        let environment = self.environment();
        debug!("Resolving API credentials for {}", environment);
        self.apply_key_overrides(ApiCredentials::resolve(environment))
    }

    fn apply_key_overrides(&self, mut credentials: ApiCredentials) -> ApiCredentials {
        if !self.api_keys.geocoding.is_empty() {
            credentials.geocoding_api_key = Some(self.api_keys.geocoding.clone());
        }
        if !self.api_keys.map.is_empty() {
            credentials.map_api_key = Some(self.api_keys.map.clone());
        }
        credentials
    }

    /// Directory holding the persisted place list
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if !self.storage.dir.is_empty() {
            return Ok(PathBuf::from(&self.storage.dir));
        }
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key" or just "key" for top-level
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["environment"] => Some(
                self.environment
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
            ),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["storage", "dir"] => Some(self.storage.dir.clone()),

            ["geocoding", "base_url"] => Some(self.geocoding.base_url.clone()),

            ["api_keys", "geocoding"] => Some(self.api_keys.geocoding.clone()),
            ["api_keys", "map"] => Some(self.api_keys.map.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// An empty value for `environment` clears it back to detection.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["environment"] => {
                self.environment = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(Error::Config)?)
                };
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }

            ["storage", "dir"] => {
                self.storage.dir = value.to_string();
            }

            ["geocoding", "base_url"] => {
                self.geocoding.base_url = value.to_string();
            }

            ["api_keys", "geocoding"] => {
                self.api_keys.geocoding = value.to_string();
            }
            ["api_keys", "map"] => {
                self.api_keys.map = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "environment",
            "server.host",
            "server.port",
            "storage.dir",
            "geocoding.base_url",
            "api_keys.geocoding",
            "api_keys.map",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
