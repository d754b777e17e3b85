//! Checkout session wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::macros::format_description;

/// Path of the provider endpoint that creates a hosted checkout page.
pub const CHECKOUT_TARGET: &str = "/checkout/v1/payment";

/// Path on this service that receives provider notifications and browser returns.
pub const CALLBACK_PATH: &str = "/doku/callback";

/// Payer details forwarded to the provider.
///
/// Fields the provider understands but this service does not model are kept
/// in `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    /// Placeholder used when the caller supplies no customer.
    pub fn guest() -> Self {
        Self {
            id: Some("guest".to_string()),
            name: Some("Guest".to_string()),
            phone: Some("628000000000".to_string()),
            country: Some("ID".to_string()),
            extra: Map::new(),
        }
    }
}

impl Default for Customer {
    fn default() -> Self {
        Self::guest()
    }
}

/// Everything needed to open one checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Amount in the smallest currency unit. Must be positive.
    pub amount: u64,
    /// Merchant invoice number. Generated when absent.
    pub invoice_number: Option<String>,
    pub customer: Option<Customer>,
    /// Externally reachable base URL of this service, without trailing slash.
    pub callback_base: String,
    /// Allowed payment method codes. Empty lets the provider decide.
    pub payment_method_types: Vec<String>,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub invoice_number: String,
    pub payment_url: String,
    /// The provider's full response body.
    pub raw: Value,
}

/// Generate an invoice number of the form `INV-YYYYMMDD-HHMMSS-mmm` (UTC).
pub fn generate_invoice_number(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    let format = format_description!(
        "INV-[year][month][day]-[hour][minute][second]-[subsecond digits:3]"
    );
    at.format(&format)
        .unwrap_or_else(|_| format!("INV-{}", at.unix_timestamp()))
}

/// A fresh invoice number for the current instant.
pub fn new_invoice_number() -> String {
    generate_invoice_number(OffsetDateTime::now_utc())
}

// ---------------------------------------------------------------------------
// Callback / redirect URLs
// ---------------------------------------------------------------------------

/// URLs handed to the provider when a session is created. They are fixed for
/// the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackUrls {
    /// Server-to-server notification target.
    pub notification: String,
    /// Browser return target, tagged with the invoice number.
    pub return_url: String,
    /// Browser return target for failed payments.
    pub failed_url: String,
}

impl CallbackUrls {
    pub fn new(callback_base: &str, invoice_number: &str) -> Self {
        let base = callback_base.trim_end_matches('/');
        let notification = format!("{base}{CALLBACK_PATH}");
        let return_url = format!(
            "{notification}?invoice={}",
            urlencoding::encode(invoice_number)
        );
        let failed_url = format!("{return_url}&status=FAILED");
        Self {
            notification,
            return_url,
            failed_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider request body
// ---------------------------------------------------------------------------

/// Body of the create-checkout request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPayload {
    pub order: CheckoutOrder,
    pub payment: CheckoutPayment,
    pub customer: Customer,
    pub additional_info: AdditionalInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOrder {
    pub amount: u64,
    pub invoice_number: String,
    pub currency: String,
    pub callback_url: String,
    pub callback_url_cancel: String,
    pub return_url: String,
    pub success_url: String,
    pub failed_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPayment {
    /// Minutes until the checkout page expires.
    pub payment_due_date: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_method_types: Vec<String>,
}

/// Return URLs repeated under the names some checkout flows read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionalInfo {
    pub return_url: String,
    pub success_page_url: String,
    pub front_callback_url: String,
    pub doku_wallet_notify_url: String,
}

impl CheckoutPayload {
    pub fn new(
        request: CheckoutRequest,
        invoice_number: String,
        currency: &str,
        payment_due_minutes: u32,
    ) -> Self {
        let urls = CallbackUrls::new(&request.callback_base, &invoice_number);
        Self {
            order: CheckoutOrder {
                amount: request.amount,
                invoice_number,
                currency: currency.to_string(),
                callback_url: urls.notification.clone(),
                callback_url_cancel: urls.notification.clone(),
                return_url: urls.return_url.clone(),
                success_url: urls.return_url.clone(),
                failed_url: urls.failed_url,
            },
            payment: CheckoutPayment {
                payment_due_date: payment_due_minutes,
                payment_method_types: request.payment_method_types,
            },
            customer: request.customer.unwrap_or_default(),
            additional_info: AdditionalInfo {
                return_url: urls.return_url.clone(),
                success_page_url: urls.return_url.clone(),
                front_callback_url: urls.return_url,
                doku_wallet_notify_url: urls.notification,
            },
        }
    }
}

/// Read the hosted payment page URL out of a create-checkout response.
pub fn payment_url(raw: &Value) -> Option<&str> {
    raw.pointer("/response/payment/url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}
