//! CallbackProcessor.
//!
//! Every path that may end in a print goes through the same two steps:
//!
//! 1. **Verdict** – decide whether a payment report can be trusted.
//!    - Provider notifications are trusted only if their signature verifies
//!      against the exact raw body.
//!    - Browser returns and manual replays are never trusted as-is; the
//!      status is fetched fresh from the provider.
//! 2. **Settle** – an actionable report with status `SUCCESS` fires the
//!    kiosk trigger. Kiosk failures are logged and reported, never raised.
//!
//! Repeated deliveries of the same notification are not deduplicated: each
//! verified `SUCCESS` fires the kiosk again.

use std::convert::Infallible;
use std::sync::Arc;

use boothpay_sdk::client::{ClientError, DokuClient};
use boothpay_sdk::objects::{CallbackHeaders, PaymentNotification, TransactionStatus};
use boothpay_sdk::objects::checkout::CALLBACK_PATH;
use boothpay_sdk::signature::{
    REQUEST_ID_HEADER, REQUEST_TIMESTAMP_HEADER, SIGNATURE_HEADER, SignatureComponents,
    SignatureError, digest,
};
use kanau::processor::Processor;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::kiosk::{KioskError, KioskOutcome, KioskTrigger, NotifyKiosk};
use crate::config::ProviderConfig;

/// Why a report was not acted on.
#[derive(Debug, Error)]
pub enum RejectReason {
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("invalid notification body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("status lookup failed: {0}")]
    StatusLookup(#[from] ClientError),
}

/// Outcome of the verification step.
#[derive(Debug)]
pub enum CallbackVerdict {
    /// The report is authentic and may be acted on.
    Actionable(PaymentNotification),
    /// The report must not be acted on.
    Rejected(RejectReason),
}

/// Outcome of the settle step.
#[derive(Debug)]
pub enum Settlement {
    /// The payment is not (yet) successful, the kiosk was left alone.
    NotSettled,
    /// The kiosk trigger ran (or was skipped for lack of an endpoint).
    Triggered(KioskOutcome),
    /// The kiosk trigger failed. Nothing retries it.
    TriggerFailed(KioskError),
}

impl Settlement {
    pub fn is_triggered(&self) -> bool {
        matches!(self, Settlement::Triggered(_))
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// A provider notification exactly as received.
#[derive(Debug, Clone)]
pub struct InboundNotification {
    pub headers: CallbackHeaders,
    pub body: Vec<u8>,
}

/// What the provider gets told, and what happened internally.
#[derive(Debug)]
pub struct NotificationReceipt {
    /// The notification was verified. This is the only thing the provider sees.
    pub accepted: bool,
    pub reason: Option<String>,
    pub status: Option<TransactionStatus>,
    pub settlement: Option<Settlement>,
}

/// A payer's browser coming back from the checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserReturn {
    pub invoice_number: Option<String>,
}

/// Where to send the returning browser.
#[derive(Debug)]
pub enum ReturnOutcome {
    /// No invoice could be recovered from the request.
    NoInvoice,
    /// The provider was asked and answered.
    Checked {
        invoice_number: String,
        status: TransactionStatus,
        settlement: Settlement,
    },
    /// The provider could not be asked.
    LookupFailed {
        invoice_number: String,
        error: ClientError,
    },
}

/// Operator-initiated replay of the kiosk trigger for an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTrigger {
    pub invoice_number: String,
}

/// Result of a manual replay.
#[derive(Debug)]
pub struct TriggerReport {
    pub status: TransactionStatus,
    pub settlement: Settlement,
}

/// Errors of the manual replay path.
#[derive(Debug, Error)]
pub enum ManualTriggerError {
    #[error("status lookup failed: {0}")]
    StatusLookup(#[from] ClientError),
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Verifies payment reports and fires the kiosk on success.
#[derive(Debug, Clone)]
pub struct CallbackProcessor {
    provider: Arc<ProviderConfig>,
    doku: DokuClient,
    kiosk: KioskTrigger,
}

impl CallbackProcessor {
    pub fn new(provider: Arc<ProviderConfig>, doku: DokuClient, kiosk: KioskTrigger) -> Self {
        Self {
            provider,
            doku,
            kiosk,
        }
    }

    /// Verify a provider notification against its raw body.
    ///
    /// The `Client-Id` header falls back to the configured client id when the
    /// provider omits it. Every other header is mandatory.
    pub fn verify_notification(&self, headers: &CallbackHeaders, body: &[u8]) -> CallbackVerdict {
        let verified = verify_signature(&self.provider, headers, body)
            .map_err(RejectReason::from)
            .and_then(|()| PaymentNotification::from_body(body).map_err(RejectReason::from));

        match verified {
            Ok(notification) => CallbackVerdict::Actionable(notification),
            Err(reason) => CallbackVerdict::Rejected(reason),
        }
    }

    /// Ask the provider for the current status of an invoice.
    pub async fn confirm_with_provider(&self, invoice_number: &str) -> CallbackVerdict {
        match self.doku.get_transaction_status(invoice_number).await {
            Ok(report) => CallbackVerdict::Actionable(report.into()),
            Err(e) => CallbackVerdict::Rejected(RejectReason::StatusLookup(e)),
        }
    }

    /// Fire the kiosk for a successful, verified report.
    pub async fn settle(&self, notification: &PaymentNotification) -> Settlement {
        if !notification.status.is_success() {
            return Settlement::NotSettled;
        }

        let Some(invoice_number) = notification.invoice_number.clone() else {
            warn!("Successful payment report without invoice number, not triggering kiosk");
            return Settlement::NotSettled;
        };

        let request = NotifyKiosk {
            invoice_number,
            amount: notification.amount.clone(),
        };
        match self.kiosk.process(request).await {
            Ok(outcome) => Settlement::Triggered(outcome),
            Err(e) => {
                error!(
                    invoice = ?notification.invoice_number,
                    error = %e,
                    "Kiosk trigger failed"
                );
                Settlement::TriggerFailed(e)
            }
        }
    }
}

/// Recompute the expected signature of an inbound notification and compare.
pub fn verify_signature(
    provider: &ProviderConfig,
    headers: &CallbackHeaders,
    body: &[u8],
) -> Result<(), SignatureError> {
    let request_id = headers
        .request_id
        .as_deref()
        .ok_or(SignatureError::MissingHeader(REQUEST_ID_HEADER))?;
    let request_timestamp = headers
        .request_timestamp
        .as_deref()
        .ok_or(SignatureError::MissingHeader(REQUEST_TIMESTAMP_HEADER))?;
    let received = headers
        .signature
        .as_deref()
        .ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?;

    let body_digest = digest(body);
    SignatureComponents {
        client_id: headers.client_id.as_deref().unwrap_or(&provider.client_id),
        request_id,
        request_timestamp,
        request_target: CALLBACK_PATH,
        digest: Some(&body_digest),
    }
    .verify(provider.secret_bytes(), received)
}

impl Processor<InboundNotification> for CallbackProcessor {
    type Output = NotificationReceipt;
    type Error = Infallible;
    #[tracing::instrument(skip_all, name = "Callback:Notification")]
    async fn process(
        &self,
        notification: InboundNotification,
    ) -> Result<NotificationReceipt, Infallible> {
        debug!(
            headers = ?notification.headers,
            body = %String::from_utf8_lossy(&notification.body),
            "Received provider notification"
        );

        let notification = match self.verify_notification(&notification.headers, &notification.body)
        {
            CallbackVerdict::Actionable(notification) => notification,
            CallbackVerdict::Rejected(reason) => {
                warn!(reason = %reason, "Rejected provider notification");
                return Ok(NotificationReceipt {
                    accepted: false,
                    reason: Some(reason.to_string()),
                    status: None,
                    settlement: None,
                });
            }
        };

        info!(
            invoice = ?notification.invoice_number,
            amount = ?notification.amount,
            status = %notification.status,
            "Verified provider notification"
        );
        let settlement = self.settle(&notification).await;

        Ok(NotificationReceipt {
            accepted: true,
            reason: None,
            status: Some(notification.status),
            settlement: Some(settlement),
        })
    }
}

impl Processor<BrowserReturn> for CallbackProcessor {
    type Output = ReturnOutcome;
    type Error = Infallible;
    #[tracing::instrument(skip_all, name = "Callback:BrowserReturn")]
    async fn process(&self, request: BrowserReturn) -> Result<ReturnOutcome, Infallible> {
        let Some(invoice_number) = request.invoice_number.filter(|i| !i.is_empty()) else {
            return Ok(ReturnOutcome::NoInvoice);
        };

        match self.confirm_with_provider(&invoice_number).await {
            CallbackVerdict::Actionable(notification) => {
                let settlement = self.settle(&notification).await;
                info!(invoice = %invoice_number, status = %notification.status, "Browser returned");
                Ok(ReturnOutcome::Checked {
                    invoice_number,
                    status: notification.status,
                    settlement,
                })
            }
            CallbackVerdict::Rejected(RejectReason::StatusLookup(error)) => {
                warn!(invoice = %invoice_number, error = %error, "Status lookup failed");
                Ok(ReturnOutcome::LookupFailed {
                    invoice_number,
                    error,
                })
            }
            CallbackVerdict::Rejected(reason) => {
                warn!(invoice = %invoice_number, reason = %reason, "Browser return rejected");
                Ok(ReturnOutcome::Checked {
                    invoice_number,
                    status: TransactionStatus::Unknown,
                    settlement: Settlement::NotSettled,
                })
            }
        }
    }
}

impl Processor<ManualTrigger> for CallbackProcessor {
    type Output = TriggerReport;
    type Error = ManualTriggerError;
    #[tracing::instrument(skip_all, err, name = "Callback:ManualTrigger", fields(invoice = %request.invoice_number))]
    async fn process(&self, request: ManualTrigger) -> Result<TriggerReport, ManualTriggerError> {
        let report = self.doku.get_transaction_status(&request.invoice_number).await?;
        let notification = PaymentNotification::from(report);
        let settlement = self.settle(&notification).await;
        Ok(TriggerReport {
            status: notification.status,
            settlement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KioskConfig;
    use boothpay_sdk::signature::RequestStamp;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &[u8] = b"SK-callback";

    fn provider(base: &str) -> Arc<ProviderConfig> {
        Arc::new(ProviderConfig {
            base_url: Url::parse(base).unwrap(),
            client_id: "BRN-0001".to_string(),
            secret: SECRET.into(),
            currency: "IDR".to_string(),
            payment_due_minutes: 5,
        })
    }

    fn processor(provider_base: &str, kiosk: Option<&str>) -> CallbackProcessor {
        let provider = provider(provider_base);
        let doku = DokuClient::new(
            provider.base_url.clone(),
            provider.client_id.clone(),
            provider.secret_bytes().to_vec(),
        );
        let kiosk = KioskTrigger::new(&KioskConfig {
            endpoint: kiosk.map(|k| Url::parse(k).unwrap()),
        });
        CallbackProcessor::new(provider, doku, kiosk)
    }

    fn signed(body: &[u8], secret: &[u8]) -> InboundNotification {
        let stamp = RequestStamp::fresh();
        let body_digest = digest(body);
        let signature = SignatureComponents {
            client_id: "BRN-0001",
            request_id: &stamp.request_id,
            request_timestamp: &stamp.request_timestamp,
            request_target: "/doku/callback",
            digest: Some(&body_digest),
        }
        .sign(secret);
        InboundNotification {
            headers: CallbackHeaders {
                client_id: Some("BRN-0001".to_string()),
                request_id: Some(stamp.request_id),
                request_timestamp: Some(stamp.request_timestamp),
                signature: Some(signature),
            },
            body: body.to_vec(),
        }
    }

    const SUCCESS_BODY: &[u8] =
        br#"{"order":{"invoice_number":"INV-1","amount":15000},"transaction":{"status":"SUCCESS"}}"#;

    async fn kiosk_server(expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trigger"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_verified_success_triggers_kiosk() {
        let kiosk = kiosk_server(1).await;
        let processor = processor(
            "http://provider.invalid",
            Some(&format!("{}/trigger", kiosk.uri())),
        );

        let receipt = processor.process(signed(SUCCESS_BODY, SECRET)).await.unwrap();
        assert!(receipt.accepted);
        assert_eq!(receipt.status, Some(TransactionStatus::Success));
        assert!(receipt.settlement.is_some_and(|s| s.is_triggered()));
    }

    #[tokio::test]
    async fn test_forged_signature_never_triggers() {
        let kiosk = kiosk_server(0).await;
        let processor = processor(
            "http://provider.invalid",
            Some(&format!("{}/trigger", kiosk.uri())),
        );

        let receipt = processor
            .process(signed(SUCCESS_BODY, b"attacker-secret"))
            .await
            .unwrap();
        assert!(!receipt.accepted);
        assert!(receipt.settlement.is_none());
    }

    #[tokio::test]
    async fn test_tampered_body_never_triggers() {
        let kiosk = kiosk_server(0).await;
        let processor = processor(
            "http://provider.invalid",
            Some(&format!("{}/trigger", kiosk.uri())),
        );

        let mut notification = signed(
            br#"{"order":{"invoice_number":"INV-1"},"transaction":{"status":"PENDING"}}"#,
            SECRET,
        );
        notification.body = SUCCESS_BODY.to_vec();
        let receipt = processor.process(notification).await.unwrap();
        assert!(!receipt.accepted);
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        let processor = processor("http://provider.invalid", None);
        let verdict = processor.verify_notification(&CallbackHeaders::default(), SUCCESS_BODY);
        assert!(matches!(
            verdict,
            CallbackVerdict::Rejected(RejectReason::Signature(SignatureError::MissingHeader(
                "Request-Id"
            )))
        ));
    }

    #[tokio::test]
    async fn test_client_id_header_falls_back_to_config() {
        let processor = processor("http://provider.invalid", None);
        let mut notification = signed(SUCCESS_BODY, SECRET);
        notification.headers.client_id = None;
        let verdict = processor.verify_notification(&notification.headers, &notification.body);
        assert!(matches!(verdict, CallbackVerdict::Actionable(_)));
    }

    #[tokio::test]
    async fn test_pending_notification_is_accepted_without_trigger() {
        let kiosk = kiosk_server(0).await;
        let processor = processor(
            "http://provider.invalid",
            Some(&format!("{}/trigger", kiosk.uri())),
        );
        let body = br#"{"transaction":{"invoice_number":"INV-2","status":"pending"}}"#;
        let receipt = processor.process(signed(body, SECRET)).await.unwrap();
        assert!(receipt.accepted);
        assert!(matches!(receipt.settlement, Some(Settlement::NotSettled)));
    }

    #[tokio::test]
    async fn test_kiosk_failure_does_not_reject() {
        let kiosk = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&kiosk)
            .await;
        let processor = processor(
            "http://provider.invalid",
            Some(&format!("{}/trigger", kiosk.uri())),
        );

        let receipt = processor.process(signed(SUCCESS_BODY, SECRET)).await.unwrap();
        assert!(receipt.accepted);
        assert!(matches!(receipt.settlement, Some(Settlement::TriggerFailed(_))));
    }

    #[tokio::test]
    async fn test_browser_return_requeries_provider() {
        let provider = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/v1/status/INV-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order": {"amount": 1},
                "transaction": {"status": "SUCCESS"}
            })))
            .expect(1)
            .mount(&provider)
            .await;
        let kiosk = kiosk_server(1).await;
        let processor = processor(&provider.uri(), Some(&format!("{}/trigger", kiosk.uri())));

        let outcome = processor
            .process(BrowserReturn {
                invoice_number: Some("INV-3".to_string()),
            })
            .await
            .unwrap();
        match outcome {
            ReturnOutcome::Checked {
                invoice_number,
                status,
                settlement,
            } => {
                assert_eq!(invoice_number, "INV-3");
                assert_eq!(status, TransactionStatus::Success);
                assert!(settlement.is_triggered());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_browser_return_without_invoice() {
        let processor = processor("http://provider.invalid", None);
        let outcome = processor
            .process(BrowserReturn {
                invoice_number: None,
            })
            .await
            .unwrap();
        assert!(matches!(outcome, ReturnOutcome::NoInvoice));
    }

    #[tokio::test]
    async fn test_manual_trigger_pending_does_not_fire() {
        let provider = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/v1/status/INV-4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transaction": {"status": "PENDING"}
            })))
            .mount(&provider)
            .await;
        let kiosk = kiosk_server(0).await;
        let processor = processor(&provider.uri(), Some(&format!("{}/trigger", kiosk.uri())));

        let report = processor
            .process(ManualTrigger {
                invoice_number: "INV-4".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(report.status, TransactionStatus::Pending);
        assert!(matches!(report.settlement, Settlement::NotSettled));
    }

    #[tokio::test]
    async fn test_manual_trigger_lookup_failure() {
        let provider = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
            .mount(&provider)
            .await;
        let processor = processor(&provider.uri(), None);

        let err = processor
            .process(ManualTrigger {
                invoice_number: "INV-5".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ManualTriggerError::StatusLookup(ClientError::Upstream { .. })));
    }
}
