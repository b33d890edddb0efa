//! Wire types for the backend REST API.
//!
//! Shapes mirror the backend's serializers exactly; prices travel as
//! decimal strings and nested products are full snapshots, not references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{
    CartItemId, CategoryId, Email, OrderId, OrderItemId, OrderStatus, ProductId, Quantity, UserId,
    WishlistItemId,
};

// =============================================================================
// Identity
// =============================================================================

/// The authenticated user's profile as reported by `/users/me/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Credentials submitted to the token endpoint.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Payload for the registration endpoint.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of a refresh-token exchange.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response of a refresh-token exchange: a fresh access token only.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub product_count: Option<u32>,
}

/// A product. Read-only from the storefront's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub trending: bool,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Query parameters accepted by the product listing endpoint.
///
/// Search and filtering are backend-owned; the storefront only forwards
/// what the user typed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trending: Option<bool>,
}

impl ProductQuery {
    /// A query that selects only featured products.
    #[must_use]
    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            ..Self::default()
        }
    }

    /// A query that selects only trending products.
    #[must_use]
    pub fn trending() -> Self {
        Self {
            trending: Some(true),
            ..Self::default()
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line of the authenticated user's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: Quantity,
}

impl CartItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }
}

/// Payload for adding a product to the cart.
#[derive(Debug, Serialize)]
pub(crate) struct CartAddRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Payload for changing a cart line's quantity.
#[derive(Debug, Serialize)]
pub(crate) struct CartUpdateRequest {
    pub quantity: Quantity,
}

// =============================================================================
// Wishlist
// =============================================================================

/// One entry in the authenticated user's wishlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product: Product,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for adding a product to the wishlist.
#[derive(Debug, Serialize)]
pub(crate) struct WishlistAddRequest {
    pub product_id: ProductId,
}

/// Response of the wishlist count endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct WishlistCountResponse {
    pub count: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// A line of a placed order. `price` is the snapshot taken at purchase
/// time, not the product's live price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product: Product,
    pub quantity: Quantity,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl OrderItem {
    /// Line total at the recorded purchase price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.get())
    }
}

/// An order as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    pub shipping_address: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: OrderStatus,
}

/// One line of an order-creation payload.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Payload for placing an order from the current cart contents.
#[derive(Debug, Serialize)]
pub struct OrderDraft {
    pub shipping_address: String,
    pub phone: String,
    pub items_write: Vec<OrderItemDraft>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    pub(crate) fn sample_product(id: i64, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            stock: 10,
            image: None,
            category: None,
            featured: false,
            trending: false,
        }
    }

    #[test]
    fn test_product_decodes_backend_shape() {
        let json = r#"{
            "id": 3,
            "name": "Steel Bottle",
            "description": "One litre",
            "price": "499.00",
            "stock": 12,
            "image": "http://backend/media/products/bottle.jpg",
            "category": {"id": 1, "name": "Kitchen", "slug": "kitchen"},
            "featured": true,
            "trending": false
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Decimal::from_str("499.00").unwrap());
        assert_eq!(product.category.as_ref().unwrap().slug, "kitchen");
        assert!(product.in_stock());
    }

    #[test]
    fn test_cart_item_line_total() {
        let item = CartItem {
            id: CartItemId::new(1),
            product: sample_product(1, "500"),
            quantity: Quantity::new(2).unwrap(),
        };
        assert_eq!(item.line_total(), Decimal::from_str("1000").unwrap());
    }

    #[test]
    fn test_order_decodes_status_and_total() {
        let json = r#"{
            "id": 11,
            "created_at": "2025-11-02T10:30:00Z",
            "items": [],
            "total_amount": "1180.00",
            "shipping_address": "42 MG Road, Bengaluru",
            "phone": "9876543210",
            "status": "PROCESSING"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total_amount, Decimal::from_str("1180.00").unwrap());
    }

    #[test]
    fn test_product_query_skips_empty_params() {
        let query = ProductQuery::featured();
        let encoded = serde_json::to_value(&query).unwrap();
        let object = encoded.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get("featured").unwrap(), &serde_json::json!(true));
    }
}
