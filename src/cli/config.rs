//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "server.port")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (args.key, args.value) {
        (None, None) => show_all_config(&config),

        (Some(key), None) => match config.get(&key) {
            Some(value) if key.starts_with("api_keys.") => println!("{}", mask_key(&value)),
            Some(value) => println!("{}", value),
            None => {
                let keys = Config::available_keys().join(", ");
                return Err(Error::Config(format!(
                    "Unknown config key: {} (available: {})",
                    key, keys
                )));
            }
        },

        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config(
                "Must specify a key to set a value".to_string(),
            ));
        }
    }

    Ok(())
}

fn mask_key(value: &str) -> &'static str {
    if value.is_empty() {
        "\"\" # not configured"
    } else {
        "\"***\" # configured"
    }
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    match config.environment {
        Some(environment) => println!("environment = \"{}\"", environment),
        None => println!("environment = \"\" # detected: {}", config.environment()),
    }
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    println!("[storage]");
    if config.storage.dir.is_empty() {
        match config.storage_dir() {
            Ok(dir) => println!("dir = \"\" # using {}", dir.display()),
            Err(_) => println!("dir = \"\""),
        }
    } else {
        println!("dir = \"{}\"", config.storage.dir);
    }
    println!();

    println!("[geocoding]");
    println!("base_url = \"{}\"", config.geocoding.base_url);
    println!();

    println!("[api_keys]");
    println!("geocoding = {}", mask_key(&config.api_keys.geocoding));
    println!("map = {}", mask_key(&config.api_keys.map));
}
