//! Add command handler
//!
//! Resolves coordinates to an address and saves them as a new place.

use crate::cli::places::print_place;
use crate::cli::{open_place_book, LocationArgs};
use crate::config::Config;
use crate::error::Result;
use crate::geo::google::GoogleGeocoder;
use crate::places::resolve_place;
use clap::Args;

/// Add command arguments
#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Print the saved place as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the add command
pub async fn run(args: AddArgs) -> Result<()> {
    let config = Config::load()?;
    let credentials = config.credentials();
    let geocoder = GoogleGeocoder::from_config(&config, &credentials);

    let coords = args.location.coordinates().await?;
    let place = resolve_place(&geocoder, coords).await;

    let book = open_place_book(&config)?;
    book.add(place.clone());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&place)?);
    } else {
        println!("Saved place:");
        print_place(&place);
    }

    Ok(())
}
