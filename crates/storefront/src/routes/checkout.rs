//! Checkout, standalone payment preference and payment webhook handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::models::{
    CheckoutRequest, CheckoutResponse, CreatePaymentRequest, PaymentResponse, StatusResponse,
};
use crate::payments::PreferenceRequest;
use crate::payments::webhook::{
    Notification, NotificationQuery, REQUEST_ID_HEADER, SIGNATURE_HEADER, verify_signature,
};
use crate::routes::cart::{load_cart, save_cart};
use crate::state::AppState;

/// Record a sale for the session cart and open a payment preference.
///
/// The cart is emptied only when both steps succeed.
///
/// POST /api/checkout
#[instrument(skip(state, session, body))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let mut cart = load_cart(&session).await?;

    let outcome = state
        .checkout()
        .checkout(&cart, body.customer_info, user.as_ref())
        .await?;

    cart.clear();
    save_cart(&session, &cart).await?;
    add_breadcrumb(
        "checkout",
        "Checkout started",
        Some(&[("sale_id", outcome.sale.id.as_str())]),
    );

    Ok(Json(CheckoutResponse {
        sale_id: outcome.sale.id,
        preference_id: outcome.preference.id,
        init_point: outcome.preference.init_point,
        public_key: state.config().mercado_pago.public_key.clone(),
        total: outcome.sale.total,
    }))
}

/// Open a payment preference for a caller-supplied cart without recording
/// a sale.
///
/// POST /api/create-payment
#[instrument(skip(state, body))]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    if body.cart_items.is_empty() {
        return Err(AppError::BadRequest(
            "El carrito está vacío o es inválido.".to_string(),
        ));
    }
    let shipping_cost = body
        .shipping_cost
        .filter(|cost| !cost.is_negative())
        .ok_or_else(|| AppError::BadRequest("Costo de envío inválido.".to_string()))?;
    let customer = body
        .customer_info
        .filter(|info| !info.phone.trim().is_empty())
        .ok_or_else(|| {
            AppError::BadRequest(
                "Falta información del cliente, incluyendo el teléfono.".to_string(),
            )
        })?;

    let request = PreferenceRequest {
        items: body.cart_items,
        shipping_cost,
        customer,
        sale_id: None,
    };
    let preference = state.payments().create_preference(&request).await?;

    Ok(Json(PaymentResponse { id: preference.id }))
}

/// Payment provider notifications.
///
/// Notifications are logged and acknowledged; sale statuses are updated
/// by hand in the admin. When a webhook secret is configured the
/// `x-signature` header must match the `data.id` query parameter.
///
/// POST /api/webhook
#[instrument(skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusResponse>> {
    let notification: Notification = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable payment notification");
        AppError::BadRequest("Notificación inválida.".to_string())
    })?;

    if let Some(secret) = &state.config().mercado_pago.webhook_secret {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        verify_signature(
            secret,
            header(SIGNATURE_HEADER),
            header(REQUEST_ID_HEADER),
            query.data_id.as_deref(),
        )
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected payment notification");
            AppError::Unauthorized("Firma inválida.".to_string())
        })?;
    }

    tracing::info!(
        kind = ?notification.kind.as_ref().or(query.kind.as_ref()),
        action = ?notification.action,
        "Payment notification received"
    );
    if notification.is_payment() {
        tracing::info!(payment_id = ?notification.data_id(), "Payment notification");
    }

    Ok(Json(StatusResponse::OK))
}
