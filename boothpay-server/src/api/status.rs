//! Status polling and manual trigger API.
//!
//! # Endpoints
//!
//! - `GET  /status/{invoice}`  – fetch the provider's current status
//! - `POST /trigger/{invoice}` – replay the kiosk trigger if the invoice is paid

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use boothpay_core::processors::{ManualTrigger, ManualTriggerError, Settlement};
use boothpay_sdk::client::ClientError;
use boothpay_sdk::objects::TransactionStatus;
use kanau::processor::Processor;
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

/// Build the status API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status/{invoice}", get(get_status))
        .route("/trigger/{invoice}", post(trigger))
}

/// The provider's error payload when there is one, the error text otherwise.
fn error_detail(error: &ClientError) -> Value {
    error
        .upstream_payload()
        .cloned()
        .unwrap_or_else(|| Value::String(error.to_string()))
}

// ---------------------------------------------------------------------------
// GET /status/{invoice}
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct StatusResponse {
    ok: bool,
    status: TransactionStatus,
    raw: Value,
}

/// `GET /status/{invoice}` — proxy a status lookup to the provider.
async fn get_status(
    State(state): State<AppState>,
    Path(invoice): Path<String>,
) -> Result<Json<StatusResponse>, StatusApiError> {
    let report = state
        .doku
        .get_transaction_status(&invoice)
        .await
        .map_err(StatusApiError::Lookup)?;
    Ok(Json(StatusResponse {
        ok: true,
        status: report.status,
        raw: report.raw,
    }))
}

// ---------------------------------------------------------------------------
// POST /trigger/{invoice}
// ---------------------------------------------------------------------------

/// `POST /trigger/{invoice}` — fetch the status and fire the kiosk on success.
///
/// A kiosk failure is reported in the body but does not fail the request.
async fn trigger(
    State(state): State<AppState>,
    Path(invoice): Path<String>,
) -> Result<Json<Value>, StatusApiError> {
    let report = state
        .callbacks
        .process(ManualTrigger {
            invoice_number: invoice,
        })
        .await
        .map_err(StatusApiError::Trigger)?;

    let body = match report.settlement {
        Settlement::Triggered(outcome) => json!({
            "ok": true,
            "triggered": true,
            "response": outcome.to_json(),
        }),
        Settlement::NotSettled => json!({
            "ok": true,
            "triggered": false,
            "status": report.status,
        }),
        Settlement::TriggerFailed(e) => json!({
            "ok": true,
            "triggered": false,
            "status": report.status,
            "kiosk_error": e.to_string(),
        }),
    };
    Ok(Json(body))
}

/// Errors that can occur in the status API.
#[derive(Debug)]
enum StatusApiError {
    /// `GET /status` could not reach the provider.
    Lookup(ClientError),
    /// `POST /trigger` could not confirm the status.
    Trigger(ManualTriggerError),
}

impl IntoResponse for StatusApiError {
    fn into_response(self) -> Response {
        match self {
            StatusApiError::Lookup(e) => {
                tracing::error!(error = %e, "Status lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "failed to check status", "detail": error_detail(&e) })),
                )
                    .into_response()
            }
            StatusApiError::Trigger(ManualTriggerError::StatusLookup(e)) => {
                tracing::error!(error = %e, "Manual trigger failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "error": error_detail(&e) })),
                )
                    .into_response()
            }
        }
    }
}
