//! Coronda Platform - clients for the managed services behind the shop.
//!
//! The storefront and admin binaries never talk to `PostgreSQL` or the
//! identity provider directly. They go through the seams defined here:
//!
//! - [`store`] - `DocumentStore` trait, the `PostgreSQL` JSONB implementation
//!   and typed collection repositories
//! - [`identity`] - `IdentityProvider` trait and the Firebase Auth REST client
//! - [`auth`] - Login, registration and session sync shared by both binaries
//! - [`config`] - Environment helpers and secret validation
//! - [`db`] - Connection pool and embedded migrations
//!
//! # Test doubles
//!
//! With the `test-util` feature, [`store::MemoryDocumentStore`] and
//! [`identity::MemoryIdentity`] provide in-process implementations with
//! failure injection for router and integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod identity;
pub mod store;

pub use auth::{AuthError, AuthService, LoginOutcome, SessionState};
pub use identity::{IdentityError, IdentityProvider, IdentityUser, SessionTokens};
pub use store::{DocumentStore, StoreError};
