//! Delivery fee, zone eligibility and cart totals.
//!
//! Everything here is a pure function of the cart, the acquisition snapshot
//! and the static delivery settings, so callers recompute on every read.

use crate::entities::menu::Money;
use crate::entities::quote::{CartSummary, DeliveryQuote, DeliveryQuoteConfig};
use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};
use crate::services::cart::Cart;
use crate::services::location::LocationSnapshot;
use crate::utils::geo::haversine_distance;

pub const CALCULATING_MESSAGE: &str = "Calculating delivery fee based on your location...";
pub const STAFF_CART_DISABLED_MESSAGE: &str = "Cart is disabled for administrators.";

/// Price delivery for a cart worth `subtotal`. The first matching rule wins:
/// empty cart, acquisition pending, acquisition failed, position known.
pub fn evaluate_delivery(
    subtotal: Money,
    location: &LocationSnapshot,
    config: &DeliveryQuoteConfig,
) -> DeliveryQuote {
    if subtotal == 0 {
        return DeliveryQuote::free();
    }

    if location.loading {
        return DeliveryQuote {
            message: Some(CALCULATING_MESSAGE.to_string()),
            ..DeliveryQuote::free()
        };
    }

    if let Some(error) = &location.error {
        return DeliveryQuote {
            delivery_fee: config.flat_delivery_fee,
            distance_km: None,
            message: Some(format!(
                "Could not determine your location. A base delivery fee will be applied. Error: {}",
                error
            )),
            is_out_of_zone: false,
        };
    }

    if let Some(coordinates) = &location.coordinates {
        let distance = haversine_distance(coordinates, &config.restaurant_location);

        // Full precision for the threshold, one decimal for display.
        if distance <= config.max_delivery_distance_km {
            return DeliveryQuote {
                delivery_fee: config.flat_delivery_fee,
                distance_km: Some(distance),
                message: Some(format!(
                    "You are {:.1}km away. Delivery fee calculated.",
                    distance
                )),
                is_out_of_zone: false,
            };
        }

        return DeliveryQuote {
            delivery_fee: 0,
            distance_km: Some(distance),
            message: Some(format!(
                "Sorry, at {:.1}km away, you are outside our {}km delivery zone.",
                distance, config.max_delivery_distance_km
            )),
            is_out_of_zone: true,
        };
    }

    tracing::warn!("Location state has neither a position nor an error; applying base delivery fee");
    DeliveryQuote {
        delivery_fee: config.flat_delivery_fee,
        ..DeliveryQuote::free()
    }
}

/// The cart view for a session. Staff sessions always get the disabled view.
pub fn summarize(
    cart: &Cart,
    location: &LocationSnapshot,
    config: &DeliveryQuoteConfig,
    role: Option<UserRole>,
) -> AppResult<CartSummary> {
    if role.is_some_and(|role| role.is_staff()) {
        return Ok(staff_summary());
    }

    let subtotal = cart.subtotal();
    let quote = evaluate_delivery(subtotal, location, config);
    let total = subtotal
        .checked_add(quote.delivery_fee)
        .ok_or_else(|| AppError::BadRequest("Order total is too large".to_string()))?;

    Ok(CartSummary {
        items: cart.lines().to_vec(),
        total_items: cart.total_items(),
        subtotal,
        delivery_fee: quote.delivery_fee,
        total,
        distance_km: quote.distance_km,
        message: quote.message,
        is_out_of_zone: quote.is_out_of_zone,
    })
}

pub fn staff_summary() -> CartSummary {
    CartSummary {
        items: Vec::new(),
        total_items: 0,
        subtotal: 0,
        delivery_fee: 0,
        total: 0,
        distance_km: None,
        message: Some(STAFF_CART_DISABLED_MESSAGE.to_string()),
        is_out_of_zone: false,
    }
}
