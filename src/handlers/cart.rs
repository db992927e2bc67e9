use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::entities::menu::MenuItem;
use crate::entities::quote::CartSummary;
use crate::error::{AppError, AppResult};
use crate::services::cart::Cart;
use crate::services::pricing::{staff_summary, summarize};
use crate::utils::session::Session;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

fn summary_of(state: &AppState, session: &Session, cart: &Cart) -> AppResult<CartSummary> {
    summarize(
        cart,
        &state.location.snapshot(),
        &state.config.delivery,
        Some(session.role),
    )
}

/// Run a cart change for a customer. Staff carts are disabled, so their
/// changes are dropped and they get the disabled summary back. A rejected
/// change leaves the stored cart as it was.
async fn change_cart(
    state: &AppState,
    session: &Session,
    change: impl FnOnce(&mut Cart) -> AppResult<bool>,
    missing_id: Option<&str>,
) -> AppResult<Json<CartSummary>> {
    if session.is_staff() {
        tracing::debug!(user_id = %session.user_id, "Ignoring cart change from staff account");
        return Ok(Json(staff_summary()));
    }

    let (outcome, cart) = state.carts.update(session.user_id, change).await;
    let found = outcome.inspect_err(|e| {
        tracing::info!(user_id = %session.user_id, error = %e, "Cart change rejected");
    })?;
    if !found {
        if let Some(id) = missing_id {
            return Err(AppError::NotFound(format!("Item {} is not in your cart", id)));
        }
    }

    Ok(Json(summary_of(state, session, &cart)?))
}

/// Cart lines with totals and the delivery quote
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<CartSummary>> {
    let cart = state.carts.get(session.user_id).await;
    Ok(Json(summary_of(&state, &session, &cart)?))
}

/// Add one unit of a menu item
pub async fn add_item(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(item): Json<MenuItem>,
) -> AppResult<Json<CartSummary>> {
    if item.id.trim().is_empty() {
        return Err(AppError::BadRequest("Menu item id is required".to_string()));
    }

    change_cart(&state, &session, |cart| cart.add(item).map(|_| true), None).await
}

/// Set an item's quantity; zero removes it
pub async fn update_quantity(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<CartSummary>> {
    change_cart(
        &state,
        &session,
        |cart| cart.set_quantity(&item_id, payload.quantity),
        Some(&item_id),
    )
    .await
}

pub async fn remove_item(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(item_id): Path<String>,
) -> AppResult<Json<CartSummary>> {
    change_cart(&state, &session, |cart| Ok(cart.remove(&item_id)), Some(&item_id)).await
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<CartSummary>> {
    change_cart(
        &state,
        &session,
        |cart| {
            cart.clear();
            Ok(true)
        },
        None,
    )
    .await
}
