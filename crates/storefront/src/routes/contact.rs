//! Contact form handler.

use axum::Json;
use tracing::instrument;

use coronda_core::Email;

use crate::error::{AppError, Result};
use crate::models::{ContactRequest, StatusResponse};

/// Accept a contact message.
///
/// Messages are written to the log for the shop owner; nothing is stored.
///
/// POST /api/contact
#[instrument(skip(form))]
pub async fn submit(Json(form): Json<ContactRequest>) -> Result<Json<StatusResponse>> {
    if form.name.trim().is_empty() || form.message.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Por favor, completa todos los campos.".to_string(),
        ));
    }
    let email = Email::parse(&form.email)
        .map_err(|_| AppError::BadRequest("El email no es válido.".to_string()))?;

    tracing::info!(
        name = %form.name.trim(),
        email = %email.as_str(),
        message = %form.message.trim(),
        "Contact message received"
    );
    Ok(Json(StatusResponse::OK))
}
