//! Checkout sequence.
//!
//! One checkout is four independent steps with no compensation:
//!
//! 1. validate the customer form and cart
//! 2. write the sale as `Procesando`
//! 3. append the sale id to the signed-in user's `saleIds`
//! 4. create the payment preference
//!
//! A failed sale write aborts the checkout. A failed `saleIds` append is
//! logged and ignored. A failed preference leaves the sale behind, still
//! `Procesando`, and is reported to the caller with the orphaned sale id.

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::instrument;

use coronda_core::{
    Cart, CustomerInfo, CustomerInfoError, DEFAULT_SHIPPING_COST, Money, NewSale, Sale, SaleId,
    SaleStatus, SessionUser,
};
use coronda_platform::StoreError;
use coronda_platform::store::{DocumentStore, SaleRepository, SettingsRepository, UserRepository};

use crate::payments::{PaymentError, PaymentGateway, Preference, PreferenceRequest};

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("El carrito está vacío.")]
    EmptyCart,

    /// A customer field was left blank.
    #[error("Por favor, completa todos los campos de envío.")]
    IncompleteForm(#[from] CustomerInfoError),

    /// The sale could not be written.
    #[error("No se pudo guardar la venta: {0}")]
    SaleNotSaved(#[source] StoreError),

    /// The payment preference failed after the sale was written.
    #[error("payment preference failed for sale {sale_id}: {source}")]
    Payment {
        sale_id: SaleId,
        #[source]
        source: PaymentError,
    },
}

/// A completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    pub preference: Preference,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    store: &'a dyn DocumentStore,
    payments: &'a dyn PaymentGateway,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, payments: &'a dyn PaymentGateway) -> Self {
        Self { store, payments }
    }

    /// Shipping cost from settings, or the default when unset or unreadable.
    pub async fn shipping_cost(&self) -> Money {
        match SettingsRepository::new(self.store).shipping_cost().await {
            Ok(cost) => cost,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read shipping cost, using default");
                Money::from_units(DEFAULT_SHIPPING_COST)
            }
        }
    }

    /// Run the checkout for a cart.
    ///
    /// The caller clears the cart on success.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`].
    #[instrument(skip_all, fields(lines = cart.items.len(), user_id = ?user.map(|u| &u.id)))]
    pub async fn checkout(
        &self,
        cart: &Cart,
        mut customer: CustomerInfo,
        user: Option<&SessionUser>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        customer.validate()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping_cost = self.shipping_cost().await;
        customer.user_id = user.map(|u| u.id.clone());

        let new_sale = NewSale {
            customer_info: customer.clone(),
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total: cart.subtotal() + shipping_cost,
            status: SaleStatus::Processing,
            items: cart.to_sale_items(),
        };

        let sale = SaleRepository::new(self.store)
            .create(new_sale)
            .await
            .map_err(CheckoutError::SaleNotSaved)?;
        tracing::info!(sale_id = %sale.id, total = %sale.total, "Sale recorded");

        if let Some(user) = user
            && let Err(e) = UserRepository::new(self.store)
                .append_sale_id(&user.id, &sale.id)
                .await
        {
            tracing::warn!(
                user_id = %user.id,
                sale_id = %sale.id,
                error = %e,
                "Failed to link sale to user"
            );
        }

        let request = PreferenceRequest {
            items: cart.items.clone(),
            shipping_cost,
            customer,
            sale_id: Some(sale.id.clone()),
        };

        match self.payments.create_preference(&request).await {
            Ok(preference) => Ok(CheckoutOutcome { sale, preference }),
            Err(source) => {
                tracing::error!(
                    sale_id = %sale.id,
                    error = %source,
                    "Payment preference failed, sale left in Procesando"
                );
                Err(CheckoutError::Payment {
                    sale_id: sale.id,
                    source,
                })
            }
        }
    }
}
