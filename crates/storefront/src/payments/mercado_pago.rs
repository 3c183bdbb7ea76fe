//! Mercado Pago Checkout Preferences client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use coronda_core::{CurrencyCode, CustomerInfo};

use super::{PaymentError, PaymentGateway, Preference, PreferenceRequest, SHIPPING_ITEM_TITLE};
use crate::config::MercadoPagoConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Mercado Pago API client.
#[derive(Clone)]
pub struct MercadoPagoClient {
    inner: Arc<MercadoPagoClientInner>,
}

struct MercadoPagoClientInner {
    client: reqwest::Client,
    preferences_url: String,
    return_url: String,
    notification_url: String,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct PreferenceBody<'a> {
    items: Vec<PreferenceItem<'a>>,
    payer: Payer<'a>,
    metadata: Metadata<'a>,
    auto_return: &'static str,
    back_urls: BackUrls<'a>,
    notification_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_reference: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PreferenceItem<'a> {
    id: &'a str,
    title: &'a str,
    quantity: u32,
    unit_price: f64,
    currency_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    picture_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Payer<'a> {
    name: String,
    surname: String,
    email: &'a str,
    phone: Phone<'a>,
}

#[derive(Debug, Serialize)]
struct Phone<'a> {
    area_code: &'static str,
    number: &'a str,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    customer_info: &'a CustomerInfo,
}

#[derive(Debug, Serialize)]
struct BackUrls<'a> {
    success: &'a str,
    failure: &'a str,
    pending: &'a str,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: String,
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl<'a> PreferenceBody<'a> {
    fn build(
        request: &'a PreferenceRequest,
        return_url: &'a str,
        notification_url: &'a str,
    ) -> Self {
        let mut items: Vec<PreferenceItem<'a>> = request
            .items
            .iter()
            .map(|item| PreferenceItem {
                id: item.id.as_str(),
                title: &item.name,
                quantity: item.quantity,
                unit_price: item.price.to_f64(),
                currency_id: CurrencyCode::ARS.as_str(),
                picture_url: non_empty(&item.image_url),
                description: non_empty(&item.description),
            })
            .collect();

        if !request.shipping_cost.is_zero() && !request.shipping_cost.is_negative() {
            items.push(PreferenceItem {
                id: "shipping",
                title: SHIPPING_ITEM_TITLE,
                quantity: 1,
                unit_price: request.shipping_cost.to_f64(),
                currency_id: CurrencyCode::ARS.as_str(),
                picture_url: None,
                description: None,
            });
        }

        let (name, surname) = request.customer.split_name();

        Self {
            items,
            payer: Payer {
                name,
                surname,
                email: &request.customer.email,
                phone: Phone {
                    area_code: "",
                    number: &request.customer.phone,
                },
            },
            metadata: Metadata {
                customer_info: &request.customer,
            },
            auto_return: "approved",
            back_urls: BackUrls {
                success: return_url,
                failure: return_url,
                pending: return_url,
            },
            notification_url,
            external_reference: request.sale_id.as_ref().map(|id| id.as_str()),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

impl MercadoPagoClient {
    /// Create a new Mercado Pago client.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Config` if the access token is not a valid
    /// header value, or `PaymentError::Http` if the HTTP client cannot be built.
    pub fn new(config: &MercadoPagoConfig, notification_url: String) -> Result<Self, PaymentError> {
        let bearer = format!("Bearer {}", config.access_token.expose_secret());
        let mut auth = HeaderValue::from_str(&bearer)
            .map_err(|_| PaymentError::Config("access token is not a valid header".to_owned()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(MercadoPagoClientInner {
                client,
                preferences_url: format!(
                    "{}/checkout/preferences",
                    config.api_url.trim_end_matches('/')
                ),
                return_url: config.return_url.clone(),
                notification_url,
            }),
        })
    }

    /// Map an error status code to a `PaymentError`.
    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> PaymentError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return PaymentError::Unauthorized;
        }

        match response.text().await {
            Ok(body) => {
                let message = serde_json::from_str::<ApiErrorResponse>(&body)
                    .ok()
                    .map(|e| if e.message.is_empty() { e.error } else { e.message })
                    .filter(|m| !m.is_empty())
                    .unwrap_or(body);
                PaymentError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
            Err(e) => PaymentError::Http(e),
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    #[instrument(skip_all, fields(items = request.items.len(), sale_id = ?request.sale_id))]
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, PaymentError> {
        let body = PreferenceBody::build(
            request,
            &self.inner.return_url,
            &self.inner.notification_url,
        );

        let response = self
            .inner
            .client
            .post(&self.inner.preferences_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await);
        }

        let text = response.text().await?;
        let parsed: PreferenceResponse = serde_json::from_str(&text)
            .map_err(|e| PaymentError::Parse(format!("Failed to parse preference: {e}")))?;

        let id = parsed
            .id
            .filter(|id| !id.is_empty())
            .ok_or(PaymentError::MissingPreferenceId)?;

        tracing::info!(preference_id = %id, "Created payment preference");
        Ok(Preference {
            id,
            init_point: parsed.init_point,
        })
    }
}
