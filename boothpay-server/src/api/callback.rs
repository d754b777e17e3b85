//! Provider callback API.
//!
//! # Endpoints
//!
//! - `POST /doku/callback` – signed server-to-server payment notification
//! - `GET  /doku/callback` – payer's browser returning from the checkout page
//!
//! The POST handler always answers 200: the provider retries anything else,
//! and a rejected notification must be acknowledged without being acted on.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use boothpay_core::processors::{BrowserReturn, ReturnOutcome, Settlement};
use boothpay_sdk::objects::checkout::CALLBACK_PATH;
use kanau::processor::Processor;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::cookies::InvoiceCookie;
use crate::api::extractors::RawNotification;
use crate::state::AppState;

/// Build the callback API router.
pub fn router() -> Router<AppState> {
    Router::new().route(CALLBACK_PATH, get(browser_return).post(notification))
}

#[derive(Debug, Serialize)]
struct NotificationAck {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// `POST /doku/callback` — verify and act on a provider notification.
async fn notification(
    State(state): State<AppState>,
    RawNotification(notification): RawNotification,
) -> Json<NotificationAck> {
    let Ok(receipt) = state.callbacks.process(notification).await;
    if let Some(Settlement::TriggerFailed(e)) = &receipt.settlement {
        tracing::warn!(error = %e, "Payment verified but kiosk was not notified");
    }
    Json(NotificationAck {
        ok: receipt.accepted,
        reason: receipt.reason,
    })
}

/// Query keys a returning browser may carry the invoice number under, in
/// order of preference.
#[derive(Debug, Default, Deserialize)]
struct ReturnQuery {
    invoice: Option<String>,
    invoice_number: Option<String>,
    order_id: Option<String>,
    #[serde(rename = "orderId")]
    order_id_camel: Option<String>,
}

impl ReturnQuery {
    fn invoice_number(self) -> Option<String> {
        [
            self.invoice,
            self.invoice_number,
            self.order_id,
            self.order_id_camel,
        ]
        .into_iter()
        .flatten()
        .find(|invoice| !invoice.is_empty())
    }
}

/// `GET /doku/callback` — re-check the payment and send the browser home.
///
/// The status in the query string is ignored; the provider is asked again.
async fn browser_return(
    State(state): State<AppState>,
    Query(query): Query<ReturnQuery>,
    InvoiceCookie(cookie): InvoiceCookie,
) -> Redirect {
    let invoice_number = query.invoice_number().or(cookie);
    let Ok(outcome) = state.callbacks.process(BrowserReturn { invoice_number }).await;

    match state.config.public.landing_url(state.config.server.listen.port()) {
        Ok(landing) => landing_redirect(landing, outcome),
        Err(e) => {
            tracing::error!(error = %e, "Cannot build landing URL");
            Redirect::to(UNKNOWN_LANDING)
        }
    }
}

/// Where browsers go when nothing is known about their payment.
const UNKNOWN_LANDING: &str = "/?status=UNKNOWN";

/// Redirect to the landing page with the outcome in the query string.
fn landing_redirect(mut landing: Url, outcome: ReturnOutcome) -> Redirect {
    match outcome {
        ReturnOutcome::NoInvoice => return Redirect::to(UNKNOWN_LANDING),
        ReturnOutcome::Checked {
            invoice_number,
            status,
            ..
        } => {
            landing
                .query_pairs_mut()
                .append_pair("status", status.as_str())
                .append_pair("invoice", &invoice_number);
        }
        ReturnOutcome::LookupFailed { error, .. } => {
            landing
                .query_pairs_mut()
                .append_pair("status", "ERROR")
                .append_pair("message", &error.to_string());
        }
    }
    Redirect::to(landing.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;
    use boothpay_sdk::objects::TransactionStatus;

    #[test]
    fn test_invoice_query_precedence() {
        let query = ReturnQuery {
            invoice: Some(String::new()),
            invoice_number: None,
            order_id: Some("INV-order".to_string()),
            order_id_camel: Some("INV-camel".to_string()),
        };
        assert_eq!(query.invoice_number().as_deref(), Some("INV-order"));
        assert!(ReturnQuery::default().invoice_number().is_none());
    }

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        response.headers()[LOCATION].to_str().unwrap().to_string()
    }

    #[test]
    fn test_landing_redirect_for_checked_status() {
        let url = Url::parse("https://booth.example.com/").unwrap();
        let outcome = ReturnOutcome::Checked {
            invoice_number: "INV-1".to_string(),
            status: TransactionStatus::Unknown,
            settlement: Settlement::NotSettled,
        };
        assert_eq!(
            location(landing_redirect(url, outcome)),
            "https://booth.example.com/?status=UNKNOWN&invoice=INV-1"
        );
    }

    #[test]
    fn test_no_invoice_redirects_home() {
        let url = Url::parse("https://booth.example.com/").unwrap();
        assert_eq!(
            location(landing_redirect(url, ReturnOutcome::NoInvoice)),
            "/?status=UNKNOWN"
        );
    }
}
