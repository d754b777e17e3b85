//! Browser-facing pages.
//!
//! # Endpoints
//!
//! - `GET /`                – landing page with the quick-pay button
//! - `GET /pay/{invoice}`   – scan-to-pay page for an operator-chosen amount
//! - `GET /pay-now`         – open a nominal checkout and redirect straight to it
//!
//! Failures are answered in plain text, since a person is reading them.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use boothpay_core::config::ConfigError;
use boothpay_sdk::client::ClientError;
use boothpay_sdk::objects::CheckoutRequest;
use boothpay_sdk::objects::checkout::new_invoice_number;
use serde::Deserialize;

use crate::api::cookies::set_invoice_cookie;
use crate::config::env::split_csv;
use crate::render::pages::{StatusBadge, landing_page, pay_page};
use crate::render::{QrError, qr_data_url};
use crate::state::AppState;

/// Amount charged by `/pay/{invoice}` when the query names none.
const DEFAULT_PAY_AMOUNT: u64 = 15_000;

/// Amount charged by the quick-pay button.
const QUICK_PAY_AMOUNT: u64 = 1;

/// Build the pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/pay/{invoice}", get(pay))
        .route("/pay-now", get(pay_now))
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct LandingQuery {
    status: Option<String>,
    invoice: Option<String>,
    message: Option<String>,
}

/// `GET /` — landing page, with a status badge after a browser return.
async fn landing(Query(query): Query<LandingQuery>) -> Html<String> {
    let badge = StatusBadge::from_query(
        query.status.as_deref(),
        query.invoice.as_deref(),
        query.message.as_deref(),
    );
    Html(landing_page(badge.as_ref()))
}

// ---------------------------------------------------------------------------
// GET /pay/{invoice}
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct PayQuery {
    /// Blank counts as absent.
    amount: Option<String>,
    /// Comma-separated payment method codes.
    method: Option<String>,
    /// Overrides the configured public base URL.
    callback_base: Option<String>,
}

/// `GET /pay/{invoice}` — open a checkout session and show its QR code.
async fn pay(
    State(state): State<AppState>,
    Path(invoice): Path<String>,
    Query(query): Query<PayQuery>,
) -> Result<Response, PageError> {
    let amount = pay_amount(query.amount.as_deref())?;
    let callback_base = match query
        .callback_base
        .as_deref()
        .map(|base| base.trim_end_matches('/'))
        .filter(|base| !base.is_empty())
    {
        Some(base) => base.to_owned(),
        None => state
            .config
            .public
            .callback_base()
            .map_err(PageError::CallbackBase)?,
    };

    let session = state
        .doku
        .create_checkout_session(CheckoutRequest {
            amount,
            invoice_number: Some(invoice),
            customer: None,
            callback_base,
            payment_method_types: query.method.as_deref().map(split_csv).unwrap_or_default(),
        })
        .await?;
    let qr = qr_data_url(&session.payment_url)?;
    tracing::info!(invoice = %session.invoice_number, amount, "Pay page rendered");

    let html = pay_page(&session.invoice_number, amount, &qr, &session.payment_url);
    Ok((
        set_invoice_cookie(&session.invoice_number, state.config.public.cookie_secure()),
        Html(html),
    )
        .into_response())
}

/// The amount to charge, defaulting when the query value is missing or blank.
fn pay_amount(raw: Option<&str>) -> Result<u64, PageError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(DEFAULT_PAY_AMOUNT),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or_else(|| PageError::InvalidAmount(raw.to_owned())),
    }
}

// ---------------------------------------------------------------------------
// GET /pay-now
// ---------------------------------------------------------------------------

/// `GET /pay-now` — the landing page button: a fresh invoice for the nominal
/// amount, paid with the default payment methods.
async fn pay_now(State(state): State<AppState>) -> Result<Response, PageError> {
    let callback_base = state
        .config
        .public
        .callback_base()
        .map_err(PageError::PublicBaseUrl)?;

    let session = state
        .doku
        .create_checkout_session(CheckoutRequest {
            amount: QUICK_PAY_AMOUNT,
            invoice_number: Some(new_invoice_number()),
            customer: None,
            callback_base,
            payment_method_types: state.config.public.default_payment_methods.clone(),
        })
        .await?;
    tracing::info!(invoice = %session.invoice_number, "Quick-pay session created");

    Ok((
        set_invoice_cookie(&session.invoice_number, state.config.public.cookie_secure()),
        Redirect::to(&session.payment_url),
    )
        .into_response())
}

/// Errors that can occur while serving a page.
#[derive(Debug, thiserror::Error)]
enum PageError {
    /// `amount` is present but not a positive integer.
    #[error("amount must be a positive integer, got {0:?}")]
    InvalidAmount(String),
    /// `/pay` has neither a `callback_base` query nor a public base URL.
    #[error("set PUBLIC_BASE_URL or pass ?callback_base=")]
    CallbackBase(#[source] ConfigError),
    /// `/pay-now` requires the public base URL.
    #[error("{0}")]
    PublicBaseUrl(#[source] ConfigError),
    #[error(transparent)]
    Provider(#[from] ClientError),
    #[error(transparent)]
    Qr(#[from] QrError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::InvalidAmount(_) | PageError::CallbackBase(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            PageError::PublicBaseUrl(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
            PageError::Provider(ClientError::MissingPaymentUrl { raw }) => {
                tracing::warn!(raw = %raw, "Provider sent no payment url");
                (
                    StatusCode::BAD_GATEWAY,
                    "failed to get a payment url from the provider",
                )
                    .into_response()
            }
            PageError::Provider(e) => {
                tracing::error!(error = %e, "Checkout session request failed");
                let mut message = String::from("failed to create payment\n");
                if let ClientError::Upstream { status, raw } = &e {
                    message.push_str(&format!("HTTP {}\n", status.as_u16()));
                    message.push_str(&serde_json::to_string_pretty(raw).unwrap_or_default());
                } else {
                    message.push_str(&e.to_string());
                }
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            PageError::Qr(e) => {
                tracing::error!(error = %e, "QR rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to render QR code").into_response()
            }
        }
    }
}
