//! Ordered field lookup over provider payloads.
//!
//! The provider does not use a single payload shape for notifications and
//! status responses, so every field we care about is looked up through a
//! [`FieldPolicy`]: an ordered list of JSON pointers where the first present
//! value wins.

use serde_json::Value;

/// An ordered list of JSON pointer paths tried in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    pub paths: &'static [&'static str],
}

/// Invoice number in a payment notification.
pub const NOTIFICATION_INVOICE: FieldPolicy = FieldPolicy {
    paths: &[
        "/order/invoice_number",
        "/order/invoice_number_original",
        "/transaction/invoice_number",
    ],
};

/// Amount in a payment notification or status response.
pub const AMOUNT: FieldPolicy = FieldPolicy {
    paths: &["/order/amount", "/transaction/amount"],
};

/// Transaction status in a payment notification.
pub const NOTIFICATION_STATUS: FieldPolicy = FieldPolicy {
    paths: &["/transaction/status", "/status"],
};

/// Transaction status in a status-lookup response.
pub const LOOKUP_STATUS: FieldPolicy = FieldPolicy {
    paths: &["/transaction/status"],
};

/// Whether a JSON value counts as present.
///
/// `null`, `false`, empty strings and numeric zero are treated as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl FieldPolicy {
    /// The first present value, in path order.
    pub fn find<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        self.paths
            .iter()
            .filter_map(|path| payload.pointer(path))
            .find(|value| is_present(value))
    }

    /// The first present value rendered as text. Strings are returned
    /// verbatim, other values in their JSON form.
    pub fn text(&self, payload: &Value) -> Option<String> {
        self.find(payload).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_path_wins() {
        let payload = json!({
            "order": {"invoice_number": "INV-A", "invoice_number_original": "INV-B"},
            "transaction": {"invoice_number": "INV-C"}
        });
        assert_eq!(NOTIFICATION_INVOICE.text(&payload).as_deref(), Some("INV-A"));
    }

    #[test]
    fn test_falls_through_absent_and_empty() {
        let payload = json!({
            "order": {"invoice_number": "", "invoice_number_original": null},
            "transaction": {"invoice_number": "INV-C"}
        });
        assert_eq!(NOTIFICATION_INVOICE.text(&payload).as_deref(), Some("INV-C"));
    }

    #[test]
    fn test_zero_amount_counts_as_absent() {
        let payload = json!({"order": {"amount": 0}, "transaction": {"amount": 15000}});
        assert_eq!(AMOUNT.text(&payload).as_deref(), Some("15000"));
    }

    #[test]
    fn test_string_amount_is_verbatim() {
        let payload = json!({"order": {"amount": "15000.00"}});
        assert_eq!(AMOUNT.text(&payload).as_deref(), Some("15000.00"));
    }

    #[test]
    fn test_status_top_level_fallback() {
        let payload = json!({"status": "success"});
        assert_eq!(NOTIFICATION_STATUS.text(&payload).as_deref(), Some("success"));
        assert_eq!(LOOKUP_STATUS.text(&payload), None);
    }

    #[test]
    fn test_nothing_present() {
        assert_eq!(AMOUNT.find(&json!({})), None);
        assert_eq!(AMOUNT.find(&json!("not an object")), None);
    }
}
