//! Places command handler
//!
//! View and manage saved places.

use crate::cli::open_place_book;
use crate::config::Config;
use crate::error::Result;
use crate::geo::Coordinates;
use crate::places::{Place, PlaceEdit};
use clap::{Args, Subcommand};

/// Places command arguments
#[derive(Args)]
pub struct PlacesArgs {
    #[command(subcommand)]
    pub command: Option<PlacesCommand>,
}

/// Places subcommands
#[derive(Subcommand)]
pub enum PlacesCommand {
    /// List saved places
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a specific place
    Show {
        /// Place ID (or unique prefix)
        id: String,
    },
    /// Edit a place; fields not given are kept
    Edit {
        /// Place ID (or unique prefix)
        id: String,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        flag: Option<String>,

        #[arg(long, allow_hyphen_values = true, requires = "lng")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,
    },
    /// Delete a place
    Delete {
        /// Place ID (or unique prefix)
        id: String,
    },
    /// Delete all places
    Clear,
}

/// Run the places command
pub fn run(args: PlacesArgs) -> Result<()> {
    let command = args.command.unwrap_or(PlacesCommand::List { json: false });

    match command {
        PlacesCommand::List { json } => list_places(json),
        PlacesCommand::Show { id } => show_place(&id),
        PlacesCommand::Edit {
            id,
            address,
            country,
            flag,
            lat,
            lng,
        } => {
            let coords = match lat.zip(lng) {
                Some((lat, lng)) => Some(Coordinates::checked(lat, lng)?),
                None => None,
            };
            edit_place(
                &id,
                PlaceEdit {
                    address,
                    country,
                    flag_emoji: flag,
                    coords,
                },
            )
        }
        PlacesCommand::Delete { id } => delete_place(&id),
        PlacesCommand::Clear => clear_places(),
    }
}

/// Print one place in the long form
pub(crate) fn print_place(place: &Place) {
    println!("  ID: {}", place.id);
    println!("  Address: {}", place.display_address());
    if let Some(country) = &place.country {
        let flag = place.flag_emoji.as_deref().unwrap_or("");
        println!("  Country: {} {}", flag, country);
    }
    println!("  Coordinates: {}", place.coords);
    println!("  Created: {}", place.created_at);
}

fn list_places(json: bool) -> Result<()> {
    let config = Config::load()?;
    let places = open_place_book(&config)?.list();

    if json {
        println!("{}", serde_json::to_string_pretty(&places)?);
        return Ok(());
    }

    if places.is_empty() {
        println!("No saved places.");
        return Ok(());
    }

    println!("Saved places ({}):\n", places.len());

    for place in &places {
        let flag = place.flag_emoji.as_deref().unwrap_or("  ");
        println!(
            "  {} {} {}\n    {} | {}\n",
            place.short_id(),
            flag,
            place.display_address(),
            place.coords,
            place.created_at
        );
    }

    Ok(())
}

fn show_place(id: &str) -> Result<()> {
    let config = Config::load()?;
    let place = open_place_book(&config)?.find_by_prefix(id)?;

    println!("Place:");
    print_place(&place);
    Ok(())
}

fn edit_place(id: &str, edit: PlaceEdit) -> Result<()> {
    let config = Config::load()?;
    let book = open_place_book(&config)?;

    let current = book.find_by_prefix(id)?;
    let place = book.edit(&current.id, edit)?;

    println!("Updated place:");
    print_place(&place);
    Ok(())
}

fn delete_place(id: &str) -> Result<()> {
    let config = Config::load()?;
    let book = open_place_book(&config)?;

    let place = book.find_by_prefix(id)?;
    book.remove(&place.id);

    println!("Deleted place: {}", place.id);
    Ok(())
}

fn clear_places() -> Result<()> {
    let config = Config::load()?;
    let count = open_place_book(&config)?.clear();

    println!("Cleared {} places.", count);
    Ok(())
}
