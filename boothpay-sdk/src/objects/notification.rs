//! Provider-pushed payment notifications.

use serde_json::Value;

use super::extract::{AMOUNT, NOTIFICATION_INVOICE, NOTIFICATION_STATUS};
use super::status::{TransactionStatus, TransactionStatusReport};

/// The signature-related headers of an inbound notification, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackHeaders {
    pub client_id: Option<String>,
    pub request_id: Option<String>,
    pub request_timestamp: Option<String>,
    pub signature: Option<String>,
}

/// The fields of a notification the bridge acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentNotification {
    pub invoice_number: Option<String>,
    pub amount: Option<String>,
    pub status: TransactionStatus,
    pub raw: Value,
}

impl PaymentNotification {
    /// Interpret an already-parsed notification payload.
    pub fn from_payload(raw: Value) -> Self {
        Self {
            invoice_number: NOTIFICATION_INVOICE.text(&raw),
            amount: AMOUNT.text(&raw),
            status: TransactionStatus::from_optional(NOTIFICATION_STATUS.text(&raw).as_deref()),
            raw,
        }
    }

    /// Parse the raw notification body.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body).map(Self::from_payload)
    }
}

impl From<TransactionStatusReport> for PaymentNotification {
    fn from(report: TransactionStatusReport) -> Self {
        Self {
            invoice_number: Some(report.invoice_number),
            amount: report.amount,
            status: report.status,
            raw: report.raw,
        }
    }
}
