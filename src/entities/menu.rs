use serde::{Deserialize, Serialize};

/// Amount in naira. Payment gateways take kobo, see [`to_kobo`].
pub type Money = u64;

/// Largest cart subtotal (and flat delivery fee) the store accepts. Keeps
/// `subtotal + fee` and its kobo amount well inside `u64`.
pub const MAX_CART_SUBTOTAL: Money = 1_000_000_000_000;

/// `None` when the amount does not fit in kobo.
pub fn to_kobo(amount: Money) -> Option<u64> {
    amount.checked_mul(100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartLine {
    /// `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.item.price.checked_mul(Money::from(self.quantity))
    }
}
