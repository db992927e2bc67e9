use axum::{extract::Path, Extension, Json};
use serde::Deserialize;

use crate::entities::order::{OrderDraft, OrderStatus};
use crate::error::{AppError, AppResult};
use crate::utils::session::Session;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Orders are not stored yet, so history is always empty.
pub async fn list_orders(
    Extension(session): Extension<Session>,
) -> Json<Vec<OrderDraft>> {
    tracing::debug!(user_id = %session.user_id, "Order history requested");
    Json(Vec::new())
}

pub async fn get_order(
    Extension(session): Extension<Session>,
    Path(reference): Path<String>,
) -> AppResult<Json<OrderDraft>> {
    tracing::debug!(user_id = %session.user_id, %reference, "Order lookup");
    Err(AppError::NotFound("Order not found".to_string()))
}

/// Staff move orders through their lifecycle; switched off until orders persist.
pub async fn update_order_status(
    Extension(session): Extension<Session>,
    Path(reference): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderDraft>> {
    tracing::info!(
        user_id = %session.user_id,
        %reference,
        status = ?payload.status,
        "Order status update attempt"
    );
    Err(AppError::Disabled(
        "Order status update functionality is disabled.".to_string(),
    ))
}
