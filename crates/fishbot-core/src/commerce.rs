//! Commerce backend trait.
//!
//! Defines the interface to the remote catalog and cart service.
//! Implementations live in fishbot-infra. Authentication is the
//! implementation's concern: the token is obtained once at construction
//! and these methods never see it.

use fishbot_types::catalog::{CartLine, Product, ProductSummary};
use fishbot_types::error::CommerceError;
use fishbot_types::ids::{ChatId, ProductId};

/// Trait for the catalog and cart backend.
///
/// Each chat owns one cart, keyed by its chat id. Prices stay in the
/// backend's formatted display form.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait CommerceApi: Send + Sync {
    /// List the purchasable products, in the backend's order.
    fn list_products(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ProductSummary>, CommerceError>> + Send;

    /// Fetch one product's full card, image link resolved.
    /// Returns `CommerceError::NotFound` for an unknown id.
    fn product_detail(
        &self,
        id: &ProductId,
    ) -> impl std::future::Future<Output = Result<Product, CommerceError>> + Send;

    /// Add `quantity` units of a product to the chat's cart.
    /// Repeated calls add repeated quantities.
    fn add_to_cart(
        &self,
        chat: ChatId,
        id: &ProductId,
        quantity: u32,
    ) -> impl std::future::Future<Output = Result<(), CommerceError>> + Send;

    /// Current cart contents. An empty cart is an empty vec, not an error.
    fn cart_items(
        &self,
        chat: ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<CartLine>, CommerceError>> + Send;

    /// Formatted total of the chat's cart, e.g. `"$62.50"`.
    fn cart_total(
        &self,
        chat: ChatId,
    ) -> impl std::future::Future<Output = Result<String, CommerceError>> + Send;

    /// Remove a cart line by its id. Removing an absent line is a no-op.
    fn remove_from_cart(
        &self,
        chat: ChatId,
        id: &ProductId,
    ) -> impl std::future::Future<Output = Result<(), CommerceError>> + Send;
}
