//! Saved places
//!
//! A [`Place`] is one saved location with the address snapshot resolved when
//! it was created. The list of places lives in a [`Store`] under the
//! `places` key and is only ever changed by replacing whole records.

use crate::constants::storage::PLACES_KEY;
use crate::error::{Error, Result};
use crate::geo::{AddressResolution, Coordinates, ReverseGeocoder};
use crate::store::{StorageBackend, Store};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// One saved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Generated at construction, never reassigned
    pub id: String,

    /// Calendar date the place was created
    pub created_at: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_emoji: Option<String>,

    #[serde(default)]
    pub coords: Coordinates,
}

/// Fields a new place can be created with
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDraft {
    pub country: Option<String>,
    pub address: Option<String>,
    pub flag_emoji: Option<String>,
    pub coords: Option<Coordinates>,
}

/// Fields an edit may change; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceEdit {
    pub country: Option<String>,
    pub address: Option<String>,
    pub flag_emoji: Option<String>,
    pub coords: Option<Coordinates>,
}

impl Place {
    /// Create a place from a partial set of fields
    ///
    /// Provided fields are kept as given; `id` and `created_at` are always
    /// generated here.
    pub fn new(draft: PlaceDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Local::now().date_naive(),
            country: draft.country,
            address: draft.address,
            flag_emoji: draft.flag_emoji,
            coords: draft.coords.unwrap_or_default(),
        }
    }

    /// Create a place from a resolved address
    pub fn from_resolution(coords: Coordinates, resolution: AddressResolution) -> Self {
        Self::new(PlaceDraft {
            country: resolution.country,
            address: Some(resolution.address),
            flag_emoji: resolution.flag_emoji,
            coords: Some(coords),
        })
    }

    /// A new record with the edit applied; identity and date are kept
    pub fn edited(&self, edit: PlaceEdit) -> Self {
        Self {
            id: self.id.clone(),
            created_at: self.created_at,
            country: edit.country.or_else(|| self.country.clone()),
            address: edit.address.or_else(|| self.address.clone()),
            flag_emoji: edit.flag_emoji.or_else(|| self.flag_emoji.clone()),
            coords: edit.coords.unwrap_or(self.coords),
        }
    }

    /// Shortened id for display
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// Address for display
    pub fn display_address(&self) -> &str {
        self.address
            .as_deref()
            .unwrap_or(crate::constants::address::UNKNOWN_ADDRESS)
    }
}

/// Resolve the address for `coords` and build a new place from it
///
/// Never fails: an unresolvable address is saved as `"unknown address"`.
pub async fn resolve_place<G: ReverseGeocoder>(geocoder: &G, coords: Coordinates) -> Place {
    let resolution = geocoder.resolve_address(coords).await;
    Place::from_resolution(coords, resolution)
}

/// The persisted list of places, most recent first
#[derive(Debug)]
pub struct PlaceBook {
    store: Store<Vec<Place>>,
}

impl PlaceBook {
    /// Open the place list kept in `backend`
    pub fn open(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: Store::open(backend, PLACES_KEY, Vec::new()),
        }
    }

    /// All places
    pub fn list(&self) -> Vec<Place> {
        self.store.get()
    }

    /// Get place by ID
    pub fn get(&self, id: &str) -> Option<Place> {
        self.store
            .with(|places| places.iter().find(|p| p.id == id).cloned())
    }

    /// Find a place by ID prefix
    ///
    /// Errors if no place, or more than one, matches.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Place> {
        self.store.with(|places| {
            let mut matches = places.iter().filter(|p| p.id.starts_with(prefix));
            match (matches.next(), matches.next()) {
                (Some(place), None) => Ok(place.clone()),
                (None, _) => Err(Error::NotFound(format!("Place not found: {}", prefix))),
                (Some(_), Some(_)) => Err(Error::NotFound(format!(
                    "Place id prefix is ambiguous: {}",
                    prefix
                ))),
            }
        })
    }

    /// Add a place at the front of the list
    pub fn add(&self, place: Place) {
        info!("Saving place {} ({})", place.id, place.display_address());
        self.store.update(|places| {
            places.insert(0, place);
            true
        });
    }

    /// Replace the stored record with the same id
    ///
    /// Non-finite coordinates are rejected and nothing is changed.
    pub fn replace(&self, place: Place) -> Result<Place> {
        place.coords.validated()?;

        let id = place.id.clone();
        let saved = place.clone();

        let replaced = self.store.update(|places| {
            match places.iter_mut().find(|p| p.id == place.id) {
                Some(existing) => {
                    *existing = place;
                    true
                }
                None => false,
            }
        });

        if replaced {
            Ok(saved)
        } else {
            Err(Error::NotFound(format!("Place not found: {}", id)))
        }
    }

    /// Apply an edit to the place with `id`
    pub fn edit(&self, id: &str, edit: PlaceEdit) -> Result<Place> {
        let current = self
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("Place not found: {}", id)))?;
        self.replace(current.edited(edit))
    }

    /// Remove place by ID
    pub fn remove(&self, id: &str) -> Option<Place> {
        let mut removed = None;
        self.store.update(|places| {
            if let Some(idx) = places.iter().position(|p| p.id == id) {
                removed = Some(places.remove(idx));
                true
            } else {
                false
            }
        });
        removed
    }

    /// Remove all places, returning how many there were
    pub fn clear(&self) -> usize {
        let count = self.len();
        self.store.set(Vec::new());
        count
    }

    /// Get number of places
    pub fn len(&self) -> usize {
        self.store.with(Vec::len)
    }

    /// Check if there are no places
    pub fn is_empty(&self) -> bool {
        self.store.with(Vec::is_empty)
    }

    /// Subscribe to list changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<Place>> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{AddressLookup, ResolvedAddress};
    use crate::store::MemoryStorage;

    struct StubGeocoder(AddressLookup);

    impl ReverseGeocoder for StubGeocoder {
        async fn lookup(&self, _coords: Coordinates) -> AddressLookup {
            self.0.clone()
        }
    }

    fn create_test_book() -> (PlaceBook, Arc<dyn StorageBackend>) {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        (PlaceBook::open(backend.clone()), backend)
    }

    fn create_test_place(address: &str) -> Place {
        Place::new(PlaceDraft {
            address: Some(address.to_string()),
            coords: Some(Coordinates::new(1.0, 2.0)),
            ..Default::default()
        })
    }

    #[test]
    fn test_new_place_keeps_draft_fields() {
        let draft = PlaceDraft {
            country: Some("Italy".to_string()),
            address: Some("Piazza Navona, Rome".to_string()),
            flag_emoji: Some("🇮🇹".to_string()),
            coords: Some(Coordinates::new(41.8992, 12.4731)),
        };

        let place = Place::new(draft.clone());

        assert_eq!(place.country, draft.country);
        assert_eq!(place.address, draft.address);
        assert_eq!(place.flag_emoji, draft.flag_emoji);
        assert_eq!(Some(place.coords), draft.coords);
        assert!(!place.id.is_empty());
        assert_eq!(place.created_at, Local::now().date_naive());
    }

    #[test]
    fn test_new_place_defaults() {
        let place = Place::new(PlaceDraft::default());

        assert!(place.country.is_none());
        assert!(place.address.is_none());
        assert_eq!(place.coords, Coordinates::default());
        assert_eq!(place.display_address(), "unknown address");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Place::new(PlaceDraft::default());
        let b = Place::new(PlaceDraft::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_place_json_shape() {
        let place = Place::from_resolution(
            Coordinates::new(35.0, 139.0),
            AddressResolution {
                address: "Tokyo, Japan".to_string(),
                flag_emoji: Some("🇯🇵".to_string()),
                country: Some("Japan".to_string()),
            },
        );

        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["flagEmoji"], "🇯🇵");
        assert_eq!(json["coords"]["lat"], 35.0);
        assert!(json["createdAt"].as_str().unwrap().len() == 10);

        let parsed: Place = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, place);
    }

    #[test]
    fn test_edited_keeps_identity() {
        let place = create_test_place("Old address");
        let edited = place.edited(PlaceEdit {
            address: Some("New address".to_string()),
            ..Default::default()
        });

        assert_eq!(edited.id, place.id);
        assert_eq!(edited.created_at, place.created_at);
        assert_eq!(edited.address.as_deref(), Some("New address"));
        assert_eq!(edited.coords, place.coords);
    }

    #[tokio::test]
    async fn test_resolve_place() {
        let geocoder = StubGeocoder(AddressLookup::Found(ResolvedAddress {
            address: Some("Unter den Linden, Berlin".to_string()),
            country: crate::geo::country::resolve("DE"),
        }));

        let place = resolve_place(&geocoder, Coordinates::new(52.517, 13.389)).await;

        assert_eq!(place.address.as_deref(), Some("Unter den Linden, Berlin"));
        assert_eq!(place.country.as_deref(), Some("Germany"));
        assert_eq!(place.flag_emoji.as_deref(), Some("🇩🇪"));
        assert_eq!(place.coords, Coordinates::new(52.517, 13.389));
    }

    #[tokio::test]
    async fn test_resolve_place_failure() {
        let geocoder = StubGeocoder(AddressLookup::Failed("offline".to_string()));

        let place = resolve_place(&geocoder, Coordinates::new(1.0, 1.0)).await;

        assert_eq!(place.address.as_deref(), Some("unknown address"));
        assert!(place.country.is_none());
        assert!(place.flag_emoji.is_none());
    }

    #[test]
    fn test_add_and_reopen() {
        let (book, backend) = create_test_book();
        let first = create_test_place("First");
        let second = create_test_place("Second");

        book.add(first.clone());
        book.add(second.clone());

        let reopened = PlaceBook::open(backend);
        assert_eq!(reopened.list(), vec![second, first]);
    }

    #[test]
    fn test_replace() {
        let (book, _backend) = create_test_book();
        let place = create_test_place("Before");
        book.add(place.clone());

        let mut updated = place.clone();
        updated.address = Some("After".to_string());
        book.replace(updated).unwrap();

        assert_eq!(book.get(&place.id).unwrap().address.as_deref(), Some("After"));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_non_finite_place_does_not_drop_list_on_reopen() {
        let (book, backend) = create_test_book();
        let good = create_test_place("Good");
        book.add(good.clone());

        let mut bad = create_test_place("Bad");
        bad.coords = Coordinates::new("NaN".parse().unwrap(), 2.0);
        book.add(bad.clone());

        let reopened = PlaceBook::open(backend);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get(&good.id), Some(good));
        assert!(reopened.get(&bad.id).unwrap().coords.lat.is_nan());
    }

    #[test]
    fn test_replace_rejects_non_finite_coordinates() {
        let (book, backend) = create_test_book();
        let place = create_test_place("Finite");
        book.add(place.clone());

        let mut updated = place.clone();
        updated.coords = Coordinates::new(f64::INFINITY, 2.0);
        assert!(matches!(
            book.replace(updated),
            Err(Error::InvalidCoordinates(_))
        ));

        let edit = PlaceEdit {
            coords: Some(Coordinates::new(1.0, f64::NAN)),
            ..Default::default()
        };
        assert!(book.edit(&place.id, edit).is_err());

        assert_eq!(book.get(&place.id), Some(place.clone()));
        assert_eq!(PlaceBook::open(backend).list(), vec![place]);
    }

    #[test]
    fn test_short_id() {
        let mut place = create_test_place("Short");
        assert_eq!(place.short_id().len(), 8);
        assert!(place.id.starts_with(place.short_id()));

        place.id = "é".repeat(10);
        assert_eq!(place.short_id(), "é".repeat(8));

        place.id = "ab".to_string();
        assert_eq!(place.short_id(), "ab");
    }

    #[test]
    fn test_replace_missing() {
        let (book, _backend) = create_test_book();
        let result = book.replace(create_test_place("Nowhere"));
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(book.is_empty());
    }

    #[test]
    fn test_edit() {
        let (book, _backend) = create_test_book();
        let place = create_test_place("Before");
        book.add(place.clone());

        let edited = book
            .edit(
                &place.id,
                PlaceEdit {
                    country: Some("Narnia".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(edited.country.as_deref(), Some("Narnia"));
        assert_eq!(edited.address.as_deref(), Some("Before"));
        assert!(book.edit("missing", PlaceEdit::default()).is_err());
    }

    #[test]
    fn test_remove() {
        let (book, _backend) = create_test_book();
        let place = create_test_place("Gone soon");
        book.add(place.clone());

        assert_eq!(book.remove(&place.id), Some(place));
        assert!(book.is_empty());
        assert_eq!(book.remove("missing"), None);
    }

    #[test]
    fn test_clear() {
        let (book, backend) = create_test_book();
        for i in 0..3 {
            book.add(create_test_place(&format!("Place {}", i)));
        }

        assert_eq!(book.clear(), 3);
        assert!(book.is_empty());
        assert!(PlaceBook::open(backend).is_empty());
    }

    #[test]
    fn test_find_by_prefix() {
        let (book, _backend) = create_test_book();
        let place = create_test_place("Prefixed");
        book.add(place.clone());

        assert_eq!(book.find_by_prefix(&place.id[..8]).unwrap(), place);
        assert!(book.find_by_prefix("zzzzzzzz-not-an-id").is_err());

        book.add(create_test_place("Another"));
        assert!(book.find_by_prefix("").is_err());
    }

    #[tokio::test]
    async fn test_subscribe() {
        let (book, _backend) = create_test_book();
        let mut rx = book.subscribe();

        book.add(create_test_place("Watched"));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
