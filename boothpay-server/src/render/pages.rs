//! Server-rendered HTML pages.
//!
//! Every caller-supplied value is escaped before it is placed in markup.

use html_escape::{encode_double_quoted_attribute, encode_text};

const LANDING_STYLE: &str = "\
body{font-family:system-ui,Segoe UI,Roboto,Arial,sans-serif;margin:24px;display:flex;justify-content:center}\
.card{max-width:640px;width:100%;text-align:center;padding:24px;border:1px solid #e5e7eb;border-radius:16px;box-shadow:0 2px 12px rgba(0,0,0,.06)}\
.btn{display:inline-block;margin-top:12px;padding:12px 18px;border-radius:12px;border:0;background:#342C2A;color:#fff;text-decoration:none;font-weight:600}\
.btn:active{transform:translateY(1px)}\
.badge{margin:12px auto;max-width:560px;padding:12px 16px;border-radius:12px;border:1px solid #ddd}\
.title{margin:8px 0 4px}\
.subtitle{margin:0 0 12px;color:#6b7280;font-size:14px}";

/// Status notice shown on the landing page after a browser return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBadge {
    pub status: String,
    pub invoice: Option<String>,
    pub message: Option<String>,
}

impl StatusBadge {
    /// Build a badge from raw query values. No badge without a status.
    pub fn from_query(
        status: Option<&str>,
        invoice: Option<&str>,
        message: Option<&str>,
    ) -> Option<Self> {
        let status = status.map(str::trim).filter(|s| !s.is_empty())?;
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_owned);
        Some(Self {
            status: status.to_uppercase(),
            invoice: non_empty(invoice),
            message: non_empty(message),
        })
    }

    fn render(&self) -> String {
        let mut html = format!("<b>Status:</b> {}", encode_text(&self.status));
        if let Some(invoice) = &self.invoice {
            html.push_str(&format!(
                " &nbsp;&bull;&nbsp; <b>Invoice:</b> {}",
                encode_text(invoice)
            ));
        }
        if let Some(message) = &self.message {
            html.push_str(&format!("<br/><small>{}</small>", encode_text(message)));
        }
        format!(r#"<div class="badge">{html}</div>"#)
    }
}

/// The landing page with the quick-pay button.
pub fn landing_page(badge: Option<&StatusBadge>) -> String {
    let badge = badge.map(StatusBadge::render).unwrap_or_default();
    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta name="viewport" content="width=device-width,initial-scale=1" />
    <title>Photobooth Payment</title>
    <style>{LANDING_STYLE}</style>
  </head>
  <body>
    <div class="card">
      <h2 class="title">Photobooth &mdash; Pembayaran</h2>
      <p class="subtitle">Klik tombol di bawah untuk membuat invoice otomatis dan menuju halaman Checkout.</p>
      {badge}
      <a class="btn" href="/pay-now">Lakukan Pembayaran</a>
    </div>
  </body>
</html>
"#
    )
}

/// The scan-to-pay page for one checkout session.
pub fn pay_page(invoice_number: &str, amount: u64, qr_data_url: &str, payment_url: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Bayar {title}</title>
    <style>body{{font-family:system-ui;margin:24px;text-align:center}}</style>
  </head>
  <body>
    <h3>Scan untuk bayar</h3>
    <p>Invoice: <b>{invoice}</b><br/>Amount: <b>{amount}</b></p>
    <img src="{qr}" alt="QR to Pay" style="width:320px;height:320px"/>
    <p><a href="{link}" target="_blank" rel="noreferrer">Atau tap di sini</a></p>
  </body>
</html>
"#,
        title = encode_text(invoice_number),
        invoice = encode_text(invoice_number),
        amount = format_rupiah(amount),
        qr = encode_double_quoted_attribute(qr_data_url),
        link = encode_double_quoted_attribute(payment_url),
    )
}

/// Format an amount as Indonesian Rupiah, e.g. `Rp 15.000`.
pub fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("Rp {grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(1), "Rp 1");
        assert_eq!(format_rupiah(999), "Rp 999");
        assert_eq!(format_rupiah(15000), "Rp 15.000");
        assert_eq!(format_rupiah(1234567), "Rp 1.234.567");
    }

    #[test]
    fn test_badge_requires_status() {
        assert!(StatusBadge::from_query(None, Some("INV-1"), None).is_none());
        assert!(StatusBadge::from_query(Some(" "), None, None).is_none());
        let badge = StatusBadge::from_query(Some("success"), Some(""), None).unwrap();
        assert_eq!(badge.status, "SUCCESS");
        assert!(badge.invoice.is_none());
    }

    #[test]
    fn test_landing_page_escapes_query_values() {
        let badge = StatusBadge::from_query(
            Some("error"),
            Some("<script>alert(1)</script>"),
            Some("a & b"),
        )
        .unwrap();
        let html = landing_page(Some(&badge));
        assert!(html.contains("<b>Status:</b> ERROR"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains(r#"href="/pay-now""#));
    }

    #[test]
    fn test_landing_page_without_badge() {
        let html = landing_page(None);
        assert!(!html.contains("class=\"badge\""));
    }

    #[test]
    fn test_pay_page_contents() {
        let html = pay_page(
            "INV-1",
            15000,
            "data:image/png;base64,AAAA",
            "https://checkout.example/p?a=1&b=2",
        );
        assert!(html.contains("Invoice: <b>INV-1</b>"));
        assert!(html.contains("Rp 15.000"));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(html.contains(r#"href="https://checkout.example/p?a=1&amp;b=2""#));
    }
}
