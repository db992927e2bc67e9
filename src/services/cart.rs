use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::menu::{CartLine, MAX_CART_SUBTOTAL, MenuItem, Money};
use crate::error::{AppError, AppResult};

/// A shopping cart: one line per menu item, kept in the order items were
/// first added.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `item`, merging with an existing line for the same id.
    /// The cart is unchanged when the result would be too large.
    pub fn add(&mut self, item: MenuItem) -> AppResult<()> {
        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => {
                line.quantity = line.quantity.checked_add(1).ok_or_else(|| {
                    AppError::BadRequest(format!("Too many of {} in your cart", line.item.name))
                })?;
            }
            None => lines.push(CartLine { item, quantity: 1 }),
        }
        self.commit(lines)
    }

    /// Returns `Ok(false)` when no line has this id. A quantity of zero
    /// removes the line.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> AppResult<bool> {
        if quantity == 0 {
            return Ok(self.remove(id));
        }

        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|line| line.item.id == id) {
            Some(line) => line.quantity = quantity,
            None => return Ok(false),
        }
        self.commit(lines)?;
        Ok(true)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item.id != id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Never above [`MAX_CART_SUBTOTAL`]; changes that would exceed it are
    /// rejected.
    pub fn subtotal(&self) -> Money {
        checked_subtotal(&self.lines).unwrap_or(Money::MAX)
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    fn commit(&mut self, lines: Vec<CartLine>) -> AppResult<()> {
        match checked_subtotal(&lines) {
            Some(subtotal) if subtotal <= MAX_CART_SUBTOTAL => {
                self.lines = lines;
                Ok(())
            }
            _ => Err(AppError::BadRequest(format!(
                "Cart total cannot exceed {}",
                MAX_CART_SUBTOTAL
            ))),
        }
    }
}

fn checked_subtotal(lines: &[CartLine]) -> Option<Money> {
    lines
        .iter()
        .try_fold(0 as Money, |sum, line| sum.checked_add(line.line_total()?))
}

/// Carts for every signed-in customer, kept for the life of the process.
#[derive(Default)]
pub struct CartStore {
    carts: RwLock<HashMap<Uuid, Cart>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: Uuid) -> Cart {
        self.carts
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `change` to the user's cart, creating it if needed, and return
    /// the change's result along with the updated cart.
    pub async fn update<R>(&self, user_id: Uuid, change: impl FnOnce(&mut Cart) -> R) -> (R, Cart) {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_default();
        let result = change(cart);
        (result, cart.clone())
    }
}
