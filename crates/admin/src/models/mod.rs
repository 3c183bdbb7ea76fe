//! JSON bodies accepted and returned by the admin API.

pub mod session;

use serde::{Deserialize, Serialize};

use coronda_core::{
    AboutData, Advertisement, AdvertisementId, CategoryId, Money, Product, ProductId, SaleStatus,
    SessionUser,
};

use crate::claude::Suggestion;

pub use session::keys as session_keys;

/// `{"status": "ok"}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub const OK: Self = Self { status: "ok" };
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<SessionUser>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Revenue for one calendar month, across years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// Short English month name ("Jan".."Dec").
    pub name: &'static str,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: Money,
    pub sale_count: usize,
    pub active_products: usize,
    pub customers: usize,
    pub revenue_by_month: Vec<MonthlyRevenue>,
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// One row of the category dialog; rows without an id are new.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    pub id: Option<CategoryId>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveCategoriesRequest {
    pub categories: Vec<CategoryInput>,
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SaleStatusRequest {
    pub status: SaleStatus,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub about: AboutData,
    pub shipping_cost: Money,
    pub products: Vec<Product>,
    pub advertisements: Vec<Advertisement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedFlag {
    pub id: ProductId,
    pub featured: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub about: AboutData,
    pub shipping_cost: Money,
    #[serde(default)]
    pub featured: Vec<FeaturedFlag>,
    #[serde(default)]
    pub advertisements: Vec<Advertisement>,
    #[serde(default)]
    pub deleted_advertisement_ids: Vec<AdvertisementId>,
}
