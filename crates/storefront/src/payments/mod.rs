//! Payment provider integration.
//!
//! Checkout hands the cart to a [`PaymentGateway`], which returns a hosted
//! checkout preference for the browser wallet widget. The only production
//! implementation is [`MercadoPagoClient`]. Payment notifications arrive on
//! the webhook route and are checked with [`webhook::verify_signature`].

mod mercado_pago;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

use coronda_core::{CartItem, CustomerInfo, Money, SaleId};

pub use mercado_pago::MercadoPagoClient;

/// Title of the extra line added for shipping.
pub const SHIPPING_ITEM_TITLE: &str = "Costo de Envío";

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// Access token rejected.
    #[error("unauthorized: invalid access token")]
    Unauthorized,

    /// Response had no preference id.
    #[error("no preference id in provider response")]
    MissingPreferenceId,

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Client could not be configured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Everything needed to price and itemize one checkout.
#[derive(Debug, Clone)]
pub struct PreferenceRequest {
    pub items: Vec<CartItem>,
    pub shipping_cost: Money,
    pub customer: CustomerInfo,
    /// Sale written before the preference, used as external reference.
    pub sale_id: Option<SaleId>,
}

/// A created checkout preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub id: String,
    /// Hosted checkout URL, when the provider returns one.
    pub init_point: Option<String>,
}

/// Creates checkout preferences with a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a preference for the given cart and customer.
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, PaymentError>;
}
