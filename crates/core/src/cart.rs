//! Shopping cart arithmetic.
//!
//! The cart lives in the visitor's session. Each line is a snapshot of the
//! product taken when it was first added, so later price edits in the admin
//! do not change a cart already in progress.

use serde::{Deserialize, Serialize};

use crate::models::{Product, SaleItem};
use crate::types::{Money, ProductId};

/// Most units of one product a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// A cart line: a product snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl CartItem {
    /// Snapshot a product as a new line with quantity 1.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            quantity: 1,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

impl From<&CartItem> for SaleItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
        }
    }
}

/// The session cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// An existing line for the same product gains one unit; otherwise a new
    /// line with quantity 1 is appended.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.items.iter_mut().find(|i| i.id == product.id) {
            line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
        } else {
            self.items.push(CartItem::from_product(product));
        }
    }

    /// Remove the line for a product. Unknown ids are ignored.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|i| &i.id != id);
    }

    /// Set the quantity of a line. Zero or negative removes it; larger
    /// values are capped at [`MAX_LINE_QUANTITY`].
    ///
    /// Returns `false` if the cart has no line for `id`.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        let Some(pos) = self.items.iter().position(|i| &i.id == id) else {
            return false;
        };

        if quantity <= 0 {
            self.items.remove(pos);
        } else if let Some(line) = self.items.get_mut(pos) {
            line.quantity =
                u32::try_from(quantity).map_or(MAX_LINE_QUANTITY, |q| q.min(MAX_LINE_QUANTITY));
        }
        true
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, i| count.saturating_add(i.quantity))
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Snapshot the lines for a sale record.
    #[must_use]
    pub fn to_sale_items(&self) -> Vec<SaleItem> {
        self.items.iter().map(SaleItem::from).collect()
    }
}
