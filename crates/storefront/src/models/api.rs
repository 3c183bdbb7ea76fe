//! JSON bodies accepted and returned by the storefront API.

use serde::{Deserialize, Serialize};

use coronda_core::{Cart, CartItem, CustomerInfo, Money, Product, ProductId, SaleId, SessionUser};

// =============================================================================
// Catalog
// =============================================================================

/// Filters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Exact category name.
    pub category: Option<String>,
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
}

/// A product with the values the detail page derives from it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub average_rating: f64,
    pub in_stock: bool,
}

impl From<Product> for ProductDetail {
    fn from(product: Product) -> Self {
        Self {
            average_rating: product.average_rating(),
            in_stock: product.in_stock(),
            product,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart with its derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub count: u32,
    pub subtotal: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            count: cart.count(),
            subtotal: cart.subtotal(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

// =============================================================================
// Checkout & payments
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_info: CustomerInfo,
}

/// What the browser needs to open the hosted wallet.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub sale_id: SaleId,
    pub preference_id: String,
    pub init_point: Option<String>,
    pub public_key: String,
    pub total: Money,
}

/// Body of the standalone preference endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub shipping_cost: Option<Money>,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: String,
}

// =============================================================================
// Auth & account
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The current session user, or `null` when signed out.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<SessionUser>,
}

// =============================================================================
// Misc
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// `{"status": "ok"}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub const OK: Self = Self { status: "ok" };
}
