//! Catalog and cart value types for fishbot.
//!
//! Read models over the commerce backend. Prices and costs stay in the
//! backend's formatted display form (e.g. `"$12.50"`); the bot renders
//! them verbatim and never does arithmetic on money.

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// Menu entry: just enough of a product to label a button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
}

/// Full product card, fetched on demand when the user selects a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Formatted unit price, e.g. `"$12.50"`.
    pub price_display: String,
    pub description: String,
    /// Stock weight in kilograms as reported by the backend.
    pub weight_kg: f64,
    /// Resolved URL of the product's main image.
    pub image_url: String,
}

/// One line of a chat's cart.
///
/// `product_id` carries the backend's cart item id exactly as received;
/// it is the key the remove operation round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Formatted unit price, e.g. `"$12.50"`.
    pub unit_price_display: String,
    pub quantity: u32,
    /// Formatted cost of the whole line, e.g. `"$62.50"`.
    pub line_cost_display: String,
}
