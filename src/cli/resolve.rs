//! Resolve command handler
//!
//! Looks up the address for coordinates without saving anything.

use crate::cli::LocationArgs;
use crate::config::Config;
use crate::error::Result;
use crate::geo::google::GoogleGeocoder;
use crate::geo::{AddressLookup, ReverseGeocoder};
use clap::Args;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> Result<()> {
    let config = Config::load()?;
    let credentials = config.credentials();
    let geocoder = GoogleGeocoder::from_config(&config, &credentials);

    let coords = args.location.coordinates().await?;
    let lookup = geocoder.lookup(coords).await;

    match &lookup {
        AddressLookup::NotFound => eprintln!("No address found for {}", coords),
        AddressLookup::Failed(reason) => eprintln!("Lookup failed: {}", reason),
        AddressLookup::Found(_) => {}
    }

    let resolution = lookup.into_resolution();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{}", resolution.address);
        if let Some(country) = &resolution.country {
            let flag = resolution.flag_emoji.as_deref().unwrap_or("");
            println!("{} {}", flag, country);
        }
    }

    Ok(())
}
