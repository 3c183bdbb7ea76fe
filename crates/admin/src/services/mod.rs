//! Business logic services for admin.
//!
//! # Services
//!
//! - `catalog` - Product validation and the category dialog's bulk save
//! - `dashboard` - Revenue and shop totals
//! - `settings` - About, shipping, featured products and advertisements
//!
//! Sign-in is shared with the storefront and lives in
//! `coronda_platform::auth`.

pub mod catalog;
pub mod dashboard;
pub mod settings;
