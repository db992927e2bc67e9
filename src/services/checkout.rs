use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::entities::menu::to_kobo;
use crate::entities::order::{OrderDetails, OrderDraft, OrderStatus};
use crate::entities::quote::CartSummary;
use crate::error::{AppError, AppResult, FieldErrors};

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERENCE_LEN: usize = 9;

/// Check the checkout form, reporting every problem at once.
pub fn validate_details(details: &OrderDetails) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if details.name.trim().is_empty() {
        errors.insert("name", "Full name is required.".to_string());
    }

    if details.phone.trim().is_empty() {
        errors.insert("phone", "Phone number is required.".to_string());
    } else if details.phone.len() != 11 || !details.phone.bytes().all(|b| b.is_ascii_digit()) {
        errors.insert("phone", "Please enter a valid 11-digit phone number.".to_string());
    }

    if details.address.trim().is_empty() {
        errors.insert("address", "Delivery address is required.".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Order references look like `CX-7Q2M9ZK4D`.
pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_LEN)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();
    format!("CX-{}", suffix)
}

/// Price the customer's cart into an order ready for payment.
///
/// Refuses carts that cannot be delivered or are empty before looking at the
/// form. The cart itself is left alone; it is cleared only once an order is
/// actually placed.
pub fn prepare_order(
    user_id: Uuid,
    details: OrderDetails,
    summary: &CartSummary,
) -> AppResult<OrderDraft> {
    if summary.is_out_of_zone {
        tracing::info!(%user_id, distance_km = ?summary.distance_km, "Checkout blocked: outside delivery zone");
        return Err(AppError::BadRequest(
            summary
                .message
                .clone()
                .unwrap_or_else(|| "Your address is outside our delivery zone.".to_string()),
        ));
    }

    if summary.items.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty.".to_string()));
    }

    validate_details(&details).map_err(AppError::Validation)?;

    let payment_amount_kobo = to_kobo(summary.total)
        .ok_or_else(|| AppError::BadRequest("Order total is too large".to_string()))?;

    let draft = OrderDraft {
        reference: generate_reference(),
        user_id,
        customer: details,
        items: summary.items.clone(),
        subtotal: summary.subtotal,
        delivery_fee: summary.delivery_fee,
        total: summary.total,
        payment_amount_kobo,
        status: OrderStatus::OrderReceived,
        created_at: Utc::now(),
    };

    tracing::info!(
        %user_id,
        reference = %draft.reference,
        total = draft.total,
        "Order prepared for payment"
    );

    Ok(draft)
}
