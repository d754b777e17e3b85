//! Transaction status as reported by the provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::{AMOUNT, LOOKUP_STATUS};

/// Build the status-lookup request target for an invoice.
pub fn status_target(invoice_number: &str) -> String {
    format!("/orders/v1/status/{invoice_number}")
}

/// Transaction status reported by the provider.
///
/// The provider sends free-form uppercase strings. The ones the bridge acts
/// on are modelled explicitly, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TransactionStatus {
    Success,
    Pending,
    Failed,
    Expired,
    /// No status was present.
    Unknown,
    Other(String),
}

impl TransactionStatus {
    /// Parse a raw status string, case-insensitively. Surrounding whitespace
    /// is kept, so `" success "` is not a success.
    pub fn parse(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "" | "UNKNOWN" => Self::Unknown,
            "SUCCESS" => Self::Success,
            "PENDING" => Self::Pending,
            "FAILED" => Self::Failed,
            "EXPIRED" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parse an optional raw status, treating `None` as unknown.
    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or(Self::Unknown)
    }

    /// Whether this status means the payment is settled and the kiosk may print.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::Pending => "PENDING",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TransactionStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Result of a status lookup for one invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatusReport {
    pub invoice_number: String,
    pub status: TransactionStatus,
    /// Amount as reported, if any. Kept as text because the provider is not
    /// consistent about numbers vs strings.
    pub amount: Option<String>,
    /// The provider's full response body.
    pub raw: Value,
}

impl TransactionStatusReport {
    /// Interpret a status-lookup response body.
    pub fn from_raw(invoice_number: impl Into<String>, raw: Value) -> Self {
        let status = TransactionStatus::from_optional(LOOKUP_STATUS.text(&raw).as_deref());
        let amount = AMOUNT.text(&raw);
        Self {
            invoice_number: invoice_number.into(),
            status,
            amount,
            raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(TransactionStatus::parse("success"), TransactionStatus::Success);
        assert_eq!(TransactionStatus::parse("Pending"), TransactionStatus::Pending);
        assert_eq!(TransactionStatus::parse(""), TransactionStatus::Unknown);
        assert_eq!(
            TransactionStatus::parse("refunded"),
            TransactionStatus::Other("REFUNDED".to_string())
        );
    }

    #[test]
    fn test_padded_success_is_not_success() {
        let status = TransactionStatus::parse(" success ");
        assert_eq!(status, TransactionStatus::Other(" SUCCESS ".to_string()));
        assert!(!status.is_success());
    }

    #[test]
    fn test_only_success_is_success() {
        assert!(TransactionStatus::Success.is_success());
        assert!(!TransactionStatus::Pending.is_success());
        assert!(!TransactionStatus::Other("SUCCESSFUL".to_string()).is_success());
    }

    #[test]
    fn test_report_from_raw() {
        let raw = json!({
            "order": {"invoice_number": "INV-1", "amount": 15000},
            "transaction": {"status": "SUCCESS", "amount": 1}
        });
        let report = TransactionStatusReport::from_raw("INV-1", raw);
        assert_eq!(report.status, TransactionStatus::Success);
        assert_eq!(report.amount.as_deref(), Some("15000"));
    }

    #[test]
    fn test_report_without_status() {
        let report = TransactionStatusReport::from_raw("INV-1", json!({"order": {}}));
        assert_eq!(report.status, TransactionStatus::Unknown);
        assert_eq!(report.amount, None);
    }

    #[test]
    fn test_serializes_as_uppercase_string() {
        assert_eq!(
            serde_json::to_value(TransactionStatus::Success).unwrap(),
            json!("SUCCESS")
        );
    }
}
