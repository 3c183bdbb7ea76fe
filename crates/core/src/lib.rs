//! Coronda Core - Shared domain types.
//!
//! This crate provides the records and value types used across all Coronda
//! components:
//! - `platform` - Document store and identity provider clients
//! - `storefront` - Public catalog, cart and checkout API
//! - `admin` - Back-office API
//! - `cli` - Migrations, seeding and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, emails and sale statuses
//! - [`models`] - Document records (products, categories, sales, users, settings)
//! - [`cart`] - Session cart arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod models;
pub mod types;

pub use cart::{Cart, CartItem, MAX_LINE_QUANTITY};
pub use models::*;
pub use types::*;
