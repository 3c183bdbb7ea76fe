//! Document shapes stored in the shop's collections.
//!
//! Every record serializes with camelCase field names. The `id` field is part
//! of the in-memory record but is never persisted inside the document body;
//! the store injects it on read and strips it on write.

mod catalog;
mod content;
mod sale;
mod user;

pub use catalog::{Category, Product, ProductFields, Review};
pub use content::{
    AboutData, Advertisement, AdvertisementKind, DEFAULT_SHIPPING_COST, ShippingSettings, SliderItem,
};
pub use sale::{CustomerInfo, CustomerInfoError, NewSale, Sale, SaleItem};
pub use user::{SessionUser, StoredUser};
