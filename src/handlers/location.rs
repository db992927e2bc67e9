use axum::{extract::State, Json};

use crate::entities::quote::DeliveryQuoteConfig;
use crate::services::location::LocationSnapshot;
use crate::AppState;

/// Current acquisition state
pub async fn get_location(State(state): State<AppState>) -> Json<LocationSnapshot> {
    Json(state.location.snapshot())
}

/// Re-acquire the position and wait for the result
pub async fn retry_location(State(state): State<AppState>) -> Json<LocationSnapshot> {
    Json(state.location.request_location().await)
}

/// Restaurant location, flat fee and delivery radius
pub async fn delivery_config(State(state): State<AppState>) -> Json<DeliveryQuoteConfig> {
    Json(state.config.delivery)
}
