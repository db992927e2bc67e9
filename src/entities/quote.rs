use serde::Serialize;

use super::coordinates::Coordinates;
use super::menu::{CartLine, Money};

/// Process-wide delivery settings, fixed at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeliveryQuoteConfig {
    pub restaurant_location: Coordinates,
    pub flat_delivery_fee: Money,
    pub max_delivery_distance_km: f64,
}

/// Delivery cost and eligibility for the current cart and location.
/// Derived on every evaluation and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryQuote {
    pub delivery_fee: Money,
    pub distance_km: Option<f64>,
    pub message: Option<String>,
    pub is_out_of_zone: bool,
}

impl DeliveryQuote {
    pub fn free() -> Self {
        Self {
            delivery_fee: 0,
            distance_km: None,
            message: None,
            is_out_of_zone: false,
        }
    }
}

/// What the cart and checkout views render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub total_items: u64,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub distance_km: Option<f64>,
    pub message: Option<String>,
    pub is_out_of_zone: bool,
}
