use axum::{extract::State, Extension, Json};

use crate::entities::order::{OrderDetails, OrderDraft};
use crate::error::AppResult;
use crate::services::checkout::prepare_order;
use crate::services::pricing::summarize;
use crate::utils::session::Session;
use crate::AppState;

/// Validate the checkout form and price the order for payment
pub async fn checkout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(details): Json<OrderDetails>,
) -> AppResult<Json<OrderDraft>> {
    let cart = state.carts.get(session.user_id).await;
    let summary = summarize(
        &cart,
        &state.location.snapshot(),
        &state.config.delivery,
        Some(session.role),
    )?;

    let draft = prepare_order(session.user_id, details, &summary)?;
    Ok(Json(draft))
}
