//! Payment provider client (this service → provider).
//!
//! Every request is signed with [`SignatureComponents`] using a fresh
//! [`RequestStamp`]. Requests with a body additionally carry the body digest,
//! computed over the exact bytes that are sent.

use reqwest::{Client, Response, header::CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use super::ClientError;
use crate::objects::checkout::{
    CHECKOUT_TARGET, CheckoutPayload, CheckoutRequest, CheckoutSession, new_invoice_number,
    payment_url,
};
use crate::objects::status::{TransactionStatusReport, status_target};
use crate::signature::{
    self, CLIENT_ID_HEADER, REQUEST_ID_HEADER, REQUEST_TIMESTAMP_HEADER, RequestStamp,
    SIGNATURE_HEADER, SignatureComponents,
};

const DEFAULT_CURRENCY: &str = "IDR";
const DEFAULT_PAYMENT_DUE_MINUTES: u32 = 5;

/// Typed HTTP client for the checkout and order-status endpoints.
#[derive(Debug, Clone)]
pub struct DokuClient {
    http: Client,
    base_url: Url,
    client_id: String,
    secret: Vec<u8>,
    currency: String,
    payment_due_minutes: u32,
}

impl DokuClient {
    /// Create a new `DokuClient`.
    ///
    /// * `base_url` – provider API root (e.g. `https://api.doku.com`).
    /// * `client_id` – the provider-assigned client identifier.
    /// * `secret` – the shared HMAC secret.
    pub fn new(base_url: Url, client_id: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            client_id: client_id.into(),
            secret: secret.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            payment_due_minutes: DEFAULT_PAYMENT_DUE_MINUTES,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Currency code put on every checkout order.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Minutes until a created checkout page expires.
    pub fn with_payment_due_minutes(mut self, minutes: u32) -> Self {
        self.payment_due_minutes = minutes;
        self
    }

    fn endpoint(&self, target: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{target}"))?)
    }

    fn sign(&self, stamp: &RequestStamp, target: &str, digest: Option<&str>) -> String {
        SignatureComponents {
            client_id: &self.client_id,
            request_id: &stamp.request_id,
            request_timestamp: &stamp.request_timestamp,
            request_target: target,
            digest,
        }
        .sign(&self.secret)
    }

    /// `POST /checkout/v1/payment` – open a hosted checkout page.
    ///
    /// An invoice number of the form `INV-…` is generated when the request
    /// carries none.
    pub async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, ClientError> {
        let invoice_number = request
            .invoice_number
            .clone()
            .filter(|invoice| !invoice.is_empty())
            .unwrap_or_else(new_invoice_number);

        let payload = CheckoutPayload::new(
            request,
            invoice_number.clone(),
            &self.currency,
            self.payment_due_minutes,
        );
        tracing::debug!(
            invoice = %invoice_number,
            callback_url = %payload.order.callback_url,
            return_url = %payload.order.return_url,
            "Creating checkout session"
        );

        let body = serde_json::to_vec(&payload)?;
        let digest = signature::digest(&body);
        let stamp = RequestStamp::fresh();
        let signature = self.sign(&stamp, CHECKOUT_TARGET, Some(&digest));

        let resp = self
            .http
            .post(self.endpoint(CHECKOUT_TARGET)?)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(REQUEST_ID_HEADER, &stamp.request_id)
            .header(REQUEST_TIMESTAMP_HEADER, &stamp.request_timestamp)
            .header(SIGNATURE_HEADER, signature)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let raw = parse_response(resp).await?;
        let Some(url) = payment_url(&raw).map(str::to_owned) else {
            return Err(ClientError::MissingPaymentUrl { raw });
        };

        Ok(CheckoutSession {
            invoice_number,
            payment_url: url,
            raw,
        })
    }

    /// `GET /orders/v1/status/{invoice}` – fetch the current transaction
    /// status. Signed without a body digest.
    pub async fn get_transaction_status(
        &self,
        invoice_number: &str,
    ) -> Result<TransactionStatusReport, ClientError> {
        let target = status_target(&urlencoding::encode(invoice_number));
        let stamp = RequestStamp::fresh();
        let signature = self.sign(&stamp, &target, None);

        let resp = self
            .http
            .get(self.endpoint(&target)?)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(REQUEST_ID_HEADER, &stamp.request_id)
            .header(REQUEST_TIMESTAMP_HEADER, &stamp.request_timestamp)
            .header(SIGNATURE_HEADER, signature)
            .send()
            .await?;

        let raw = parse_response(resp).await?;
        Ok(TransactionStatusReport::from_raw(invoice_number, raw))
    }
}

/// Read a provider response body. Non-JSON bodies are kept as a JSON string
/// so they can still be attached to error responses.
async fn parse_response(resp: Response) -> Result<Value, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;
    let raw = serde_json::from_str(&text).unwrap_or(Value::String(text));
    if !status.is_success() {
        return Err(ClientError::Upstream { status, raw });
    }
    Ok(raw)
}
