//! HTTP routes
//!
//! HTML views at `/` and `/edit/:place_id`, JSON API under `/api`.

use crate::error::Error;
use crate::geo::ip_location::current_coordinates;
use crate::geo::{AddressResolution, Coordinates, ReverseGeocoder};
use crate::places::{resolve_place, Place, PlaceEdit};
use crate::server::state::AppState;
use crate::server::views;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_view))
        .route("/places", post(create_place_form))
        .route("/edit/:place_id", get(edit_view).post(edit_place_form))
        .route("/edit/:place_id/delete", post(delete_place_form))
        .route("/api/places", get(list_places_handler).post(create_place_handler))
        .route(
            "/api/places/:id",
            get(get_place_handler)
                .put(update_place_handler)
                .delete(delete_place_handler),
        )
        .route("/api/address", get(address_handler))
        .route("/api/location", get(location_handler))
        .route("/api/status", get(status_handler))
        .nest_service("/static", ServeDir::new(static_path()))
        .with_state(state)
}

/// Locate the static assets directory
///
/// Tries the working directory first, then next to the executable.
fn static_path() -> String {
    if std::path::Path::new("static").exists() {
        return "static".to_string();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|| "static".to_string())
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }

    fn not_found(id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Place not found: {}", id),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        Self::new(status, code, err.to_string())
    }
}

/// Where a new place is
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlaceRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Use the current position instead of `lat`/`lng`
    #[serde(default)]
    pub here: bool,
}

async fn requested_coordinates(
    state: &AppState,
    req: &CreatePlaceRequest,
) -> Result<Coordinates, ApiError> {
    if req.here {
        return Ok(current_coordinates(&state.locator).await);
    }

    match (req.lat, req.lng) {
        (Some(lat), Some(lng)) => Ok(Coordinates::checked(lat, lng)?),
        _ => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "MISSING_COORDINATES",
            "Provide lat and lng, or set here",
        )),
    }
}

/// Places list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacesResponse {
    pub places: Vec<Place>,
    pub count: usize,
}

/// GET /api/places
async fn list_places_handler(State(state): State<Arc<AppState>>) -> Json<PlacesResponse> {
    let places = state.places.list();
    let count = places.len();
    Json(PlacesResponse { places, count })
}

/// POST /api/places
async fn create_place_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlaceRequest>,
) -> Result<(StatusCode, Json<Place>), ApiError> {
    let coords = requested_coordinates(&state, &req).await?;
    let place = resolve_place(&state.geocoder, coords).await;
    state.places.add(place.clone());
    Ok((StatusCode::CREATED, Json(place)))
}

/// GET /api/places/:id
async fn get_place_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Place>, ApiError> {
    state
        .places
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&id))
}

/// PUT /api/places/:id
async fn update_place_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<PlaceEdit>,
) -> Result<Json<Place>, ApiError> {
    let place = state.places.edit(&id, edit)?;
    Ok(Json(place))
}

/// DELETE /api/places/:id
async fn delete_place_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .places
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::not_found(&id))
}

/// GET /api/address?lat=..&lng=..
async fn address_handler(
    State(state): State<Arc<AppState>>,
    Query(coords): Query<Coordinates>,
) -> Json<AddressResolution> {
    Json(state.geocoder.resolve_address(coords).await)
}

/// GET /api/location
async fn location_handler(State(state): State<Arc<AppState>>) -> Json<Coordinates> {
    Json(current_coordinates(&state.locator).await)
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub environment: String,
    pub places: usize,
    pub geocoding_key_configured: bool,
    pub map_key_configured: bool,
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment().to_string(),
        places: state.places.len(),
        geocoding_key_configured: state.credentials.geocoding_api_key.is_some(),
        map_key_configured: state.credentials.map_api_key.is_some(),
    })
}

/// GET /
async fn home_view(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(views::home(&state.places.list()))
}

/// GET /edit/:place_id
async fn edit_view(State(state): State<Arc<AppState>>, Path(place_id): Path<String>) -> Response {
    match state.places.get(&place_id) {
        Some(place) => Html(views::edit(&place, state.credentials.map_api_key.as_deref()))
            .into_response(),
        None => not_found_page(&place_id),
    }
}

/// Add form fields; inputs arrive as text
#[derive(Debug, Deserialize)]
pub struct AddPlaceForm {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
    pub here: Option<String>,
}

/// POST /places
async fn create_place_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddPlaceForm>,
) -> Response {
    let req = CreatePlaceRequest {
        lat: form.lat.trim().parse().ok(),
        lng: form.lng.trim().parse().ok(),
        here: form.here.is_some(),
    };

    match requested_coordinates(&state, &req).await {
        Ok(coords) => {
            state.places.add(resolve_place(&state.geocoder, coords).await);
            Redirect::to("/").into_response()
        }
        Err(err) => bad_request_page(&err.error),
    }
}

/// Edit form fields; empty inputs clear the field
#[derive(Debug, Deserialize)]
pub struct EditPlaceForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub flag_emoji: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

impl EditPlaceForm {
    /// The whole replacement record for `place`
    fn apply_to(self, place: &Place) -> Result<Place, String> {
        let lat = self
            .lat
            .trim()
            .parse()
            .map_err(|_| format!("Invalid latitude: {}", self.lat))?;
        let lng = self
            .lng
            .trim()
            .parse()
            .map_err(|_| format!("Invalid longitude: {}", self.lng))?;

        let non_empty = |value: String| {
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        };

        let coords = Coordinates::checked(lat, lng).map_err(|e| e.to_string())?;

        Ok(Place {
            address: non_empty(self.address),
            country: non_empty(self.country),
            flag_emoji: non_empty(self.flag_emoji),
            coords,
            ..place.clone()
        })
    }
}

/// POST /edit/:place_id
async fn edit_place_form(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
    Form(form): Form<EditPlaceForm>,
) -> Response {
    let Some(current) = state.places.get(&place_id) else {
        return not_found_page(&place_id);
    };

    let updated = match form.apply_to(&current) {
        Ok(place) => place,
        Err(reason) => return bad_request_page(&reason),
    };

    match state.places.replace(updated) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(_) => not_found_page(&place_id),
    }
}

/// POST /edit/:place_id/delete
async fn delete_place_form(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
) -> Response {
    match state.places.remove(&place_id) {
        Some(_) => Redirect::to("/").into_response(),
        None => not_found_page(&place_id),
    }
}

fn not_found_page(place_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(views::message(
            "Place not found",
            &format!("No place with id {}", place_id),
        )),
    )
        .into_response()
}

fn bad_request_page(reason: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(views::message("Could not save place", reason)),
    )
        .into_response()
}
