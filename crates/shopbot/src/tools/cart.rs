//! Per-session shopping cart.
//!
//! Amounts are held in integer cents and serialized as decimal dollars. The
//! derived fields (`item_count`, `subtotal`, `tax`, `total`) are recomputed
//! after every mutation.

use rand::Rng;
use serde::{Serialize, Serializer};

use super::catalog::Product;

/// Sales tax applied to the subtotal, in basis points (8%).
pub const TAX_RATE_BPS: u64 = 800;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error(
        "Cannot add {requested} x {name}: a cart line holds at most {max}.",
        max = MAX_LINE_QUANTITY
    )]
    QuantityLimit { name: String, requested: u32 },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(rename = "price", serialize_with = "as_dollars")]
    pub unit_cents: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Cart {
    pub cart_id: String,
    pub customer_id: String,
    items: Vec<CartItem>,
    item_count: u32,
    #[serde(rename = "subtotal", serialize_with = "as_dollars")]
    subtotal_cents: u64,
    #[serde(rename = "tax", serialize_with = "as_dollars")]
    tax_cents: u64,
    #[serde(rename = "total", serialize_with = "as_dollars")]
    total_cents: u64,
}

impl Cart {
    /// An empty cart for `customer_id` with a random id suffix.
    pub fn new(customer_id: impl Into<String>) -> Self {
        let customer_id = customer_id.into();
        let suffix: u32 = rand::rng().random_range(1000..10000);
        let cart_id = format!("CART_{customer_id}_{suffix}");
        Self::with_id(cart_id, customer_id)
    }

    pub fn with_id(cart_id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            cart_id: cart_id.into(),
            customer_id: customer_id.into(),
            items: Vec::new(),
            item_count: 0,
            subtotal_cents: 0,
            tax_cents: 0,
            total_cents: 0,
        }
    }

    /// Add `quantity` of `product`, merging into an existing line.
    ///
    /// Fails without touching the cart if the line would exceed
    /// [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        let existing = self.items.iter().position(|i| i.product_id == product.id);
        let current = existing.map_or(0, |idx| self.items[idx].quantity);
        let merged = current
            .checked_add(quantity)
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or_else(|| CartError::QuantityLimit {
                name: product.name.to_string(),
                requested: quantity,
            })?;
        match existing {
            Some(idx) => self.items[idx].quantity = merged,
            None => self.items.push(CartItem {
                product_id: product.id.to_string(),
                name: product.name.to_string(),
                quantity: merged,
                unit_cents: to_cents(product.price),
            }),
        }
        self.recalculate();
        Ok(())
    }

    fn recalculate(&mut self) {
        self.item_count = self.items.iter().map(|i| i.quantity).sum();
        self.subtotal_cents = self
            .items
            .iter()
            .map(|i| i.unit_cents * u64::from(i.quantity))
            .sum();
        // Half-up rounding to the cent.
        self.tax_cents = (self.subtotal_cents * TAX_RATE_BPS + 5_000) / 10_000;
        self.total_cents = self.subtotal_cents + self.tax_cents;
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn subtotal(&self) -> f64 {
        dollars(self.subtotal_cents)
    }

    pub fn tax(&self) -> f64 {
        dollars(self.tax_cents)
    }

    pub fn total(&self) -> f64 {
        dollars(self.total_cents)
    }
}

fn to_cents(price: f64) -> u64 {
    (price * 100.0).round() as u64
}

fn dollars(cents: u64) -> f64 {
    cents as f64 / 100.0
}

fn as_dollars<S: Serializer>(cents: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(dollars(*cents))
}
