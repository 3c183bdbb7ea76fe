//! Business logic services.
//!
//! Authentication is shared with the admin binary and lives in
//! `coronda_platform::auth`.

pub mod catalog;
pub mod checkout;

pub use catalog::{CatalogCache, CatalogService};
pub use checkout::{CheckoutError, CheckoutOutcome, CheckoutService};
