//! KioskTrigger processor.
//!
//! Issues a single GET to the print kiosk with the invoice number and amount
//! appended as query parameters. There is no retry and no queue: a failed
//! trigger is reported to the caller, which logs it and moves on. Operators
//! replay missed prints through the manual trigger endpoint.

use kanau::processor::Processor;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::KioskConfig;

/// Upper bound for one kiosk call.
pub const KIOSK_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur during a kiosk trigger.
#[derive(Debug, Error)]
pub enum KioskError {
    /// HTTP request error (connection refused, timeout, …)
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The kiosk answered with a non-success status.
    #[error("kiosk rejected trigger with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Ask the kiosk to print for a paid invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyKiosk {
    pub invoice_number: String,
    pub amount: Option<String>,
}

/// What happened to a trigger request.
#[derive(Debug, Clone, PartialEq)]
pub enum KioskOutcome {
    /// The kiosk accepted the call. Carries its JSON response, or
    /// `{"ok": true}` when it sent none.
    Triggered(Value),
    /// No kiosk endpoint is configured.
    Skipped,
}

impl KioskOutcome {
    /// JSON form used in API responses.
    pub fn to_json(&self) -> Value {
        match self {
            KioskOutcome::Triggered(response) => response.clone(),
            KioskOutcome::Skipped => json!({ "skipped": true }),
        }
    }
}

/// KioskTrigger delivers trigger calls to the print kiosk.
#[derive(Debug, Clone)]
pub struct KioskTrigger {
    endpoint: Option<Url>,
    http_client: reqwest::Client,
}

impl KioskTrigger {
    /// Create a new KioskTrigger with the fixed [`KIOSK_TIMEOUT`].
    pub fn new(config: &KioskConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            http_client: reqwest::Client::builder()
                .timeout(KIOSK_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Whether an endpoint is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// The trigger URL for one invoice.
    fn trigger_url(endpoint: &Url, request: &NotifyKiosk) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("invoice", &request.invoice_number)
            .append_pair("amount", request.amount.as_deref().unwrap_or("0"));
        url
    }
}

impl Processor<NotifyKiosk> for KioskTrigger {
    type Output = KioskOutcome;
    type Error = KioskError;
    #[tracing::instrument(skip_all, err, name = "Kiosk:Notify", fields(invoice = %request.invoice_number))]
    async fn process(&self, request: NotifyKiosk) -> Result<KioskOutcome, KioskError> {
        let Some(endpoint) = &self.endpoint else {
            warn!("Kiosk endpoint not configured, skipping trigger");
            return Ok(KioskOutcome::Skipped);
        };

        let url = Self::trigger_url(endpoint, &request);
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(KioskError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let response = serde_json::from_str::<Value>(&body)
            .ok()
            .filter(|value| !value.is_null())
            .unwrap_or_else(|| json!({ "ok": true }));
        info!(amount = ?request.amount, "Kiosk triggered");
        Ok(KioskOutcome::Triggered(response))
    }
}
