//! Checkout session API.
//!
//! # Endpoints
//!
//! - `POST /session` – open a checkout session and return its link as a QR image

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use boothpay_core::config::ConfigError;
use boothpay_sdk::client::ClientError;
use boothpay_sdk::objects::{CheckoutRequest, Customer};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::render::{QrError, qr_data_url};
use crate::state::AppState;

/// Build the session API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/session", post(create_session))
}

/// Request body of `POST /session`.
#[derive(Debug, Deserialize)]
struct CreateSessionBody {
    #[serde(default)]
    amount: Option<u64>,
    #[serde(default)]
    invoice_number: Option<String>,
    #[serde(default)]
    customer: Option<Customer>,
    /// `null` or absent lets the provider offer every method.
    #[serde(default)]
    payment_method_types: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    ok: bool,
    invoice_number: String,
    payment_url: String,
    payment_qr_data_url: String,
}

/// `POST /session` — create a hosted checkout page.
///
/// The invoice number is generated when absent. The payment URL is also
/// returned as a PNG QR code for display on the kiosk screen.
async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionBody>, JsonRejection>,
) -> Result<impl IntoResponse, SessionApiError> {
    let Json(body) = body?;
    let amount = body
        .amount
        .filter(|amount| *amount > 0)
        .ok_or(SessionApiError::MissingAmount)?;
    let callback_base = state.config.public.callback_base()?;

    let session = state
        .doku
        .create_checkout_session(CheckoutRequest {
            amount,
            invoice_number: body.invoice_number,
            customer: body.customer,
            callback_base,
            payment_method_types: body.payment_method_types.unwrap_or_default(),
        })
        .await?;
    tracing::info!(invoice = %session.invoice_number, amount, "Checkout session created");

    let payment_qr_data_url = qr_data_url(&session.payment_url)?;
    Ok(Json(SessionResponse {
        ok: true,
        invoice_number: session.invoice_number,
        payment_url: session.payment_url,
        payment_qr_data_url,
    }))
}

/// Errors that can occur in the session API.
#[derive(Debug, thiserror::Error)]
enum SessionApiError {
    #[error("invalid request body: {}", .0.body_text())]
    BadRequest(#[from] JsonRejection),
    #[error("amount is required")]
    MissingAmount,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] ClientError),
    #[error(transparent)]
    Qr(#[from] QrError),
}

impl IntoResponse for SessionApiError {
    fn into_response(self) -> Response {
        match self {
            SessionApiError::BadRequest(_)
            | SessionApiError::MissingAmount
            | SessionApiError::Config(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            SessionApiError::Provider(ClientError::MissingPaymentUrl { raw }) => {
                tracing::warn!(raw = %raw, "Provider sent no payment url");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "provider response has no payment url", "raw": raw })),
                )
                    .into_response()
            }
            SessionApiError::Provider(ClientError::Upstream { status, raw }) => {
                tracing::warn!(%status, raw = %raw, "Provider rejected checkout session");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "failed to create checkout session", "detail": raw })),
                )
                    .into_response()
            }
            SessionApiError::Provider(e) => {
                tracing::error!(error = %e, "Checkout session request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "failed to create checkout session",
                        "detail": e.to_string(),
                    })),
                )
                    .into_response()
            }
            SessionApiError::Qr(e) => {
                tracing::error!(error = %e, "QR rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "failed to render QR code" })),
                )
                    .into_response()
            }
        }
    }
}
