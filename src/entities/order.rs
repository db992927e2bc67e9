use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::menu::{CartLine, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Order Received")]
    OrderReceived,
    #[serde(rename = "Preparing Your Meal")]
    Preparing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

/// Contact and drop-off details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An order priced and ready for payment. Not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDraft {
    pub reference: String,
    pub user_id: Uuid,
    pub customer: OrderDetails,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub payment_amount_kobo: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
