//! Moltin REST API wire types.
//!
//! These mirror only the fields fishbot reads from Moltin's responses;
//! everything else in the payloads is ignored on deserialization. They
//! are NOT the domain types from fishbot-types -- the client maps them.

use serde::{Deserialize, Serialize};

/// Response to the client-credentials token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Envelope for `GET /v2/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductListResponse {
    pub data: Vec<ProductEntry>,
}

/// One product in the listing; only the menu needs these fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductEntry {
    pub id: String,
    pub name: String,
}

/// Envelope for `GET /v2/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetailResponse {
    pub data: ProductDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductDetail {
    pub name: String,
    pub description: String,
    pub meta: PriceMeta,
    pub weight: ProductWeight,
    pub relationships: ProductRelationships,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceMeta {
    pub display_price: DisplayPrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayPrice {
    pub with_tax: FormattedPrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormattedPrice {
    pub formatted: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductWeight {
    pub kg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRelationships {
    pub main_image: ImageRelationship,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRelationship {
    pub data: FileRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub id: String,
}

/// Envelope for `GET /v2/files/{id}`, used to resolve the product image.
#[derive(Debug, Clone, Deserialize)]
pub struct FileResponse {
    pub data: FileRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileRecord {
    pub link: FileLink,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileLink {
    pub href: String,
}

/// Envelope for `GET /v2/carts/{name}/items`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemsResponse {
    pub data: Vec<CartItemEntry>,
}

/// One cart line. `id` is the cart item id, which is also the key the
/// remove endpoint expects.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemEntry {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub meta: CartItemMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemMeta {
    pub display_price: CartItemDisplayPrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItemDisplayPrice {
    pub with_tax: CartItemPrices,
}

/// Per-line prices: `unit` is the price per unit, `value` the line total.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemPrices {
    pub unit: FormattedPrice,
    pub value: FormattedPrice,
}

/// Envelope for `GET /v2/carts/{name}`, read for the formatted total.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    pub data: CartRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartRecord {
    pub meta: PriceMeta,
}

/// Body for `POST /v2/carts/{name}/items`.
#[derive(Debug, Clone, Serialize)]
pub struct AddItemRequest {
    pub data: AddItemData,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddItemData {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: &'static str,
    pub quantity: u32,
}

impl AddItemRequest {
    pub fn new(product_id: String, quantity: u32) -> Self {
        Self {
            data: AddItemData {
                id: product_id,
                item_type: "cart_item",
                quantity,
            },
        }
    }
}
